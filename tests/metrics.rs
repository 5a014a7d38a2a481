//! Tests for the metrics module.

use serde_json::{Value, json};
use std::any::Any;
use tabreduce::metrics::{CounterMetric, Metric, MetricsCollector};

#[test]
fn test_counter_metric() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(CounterMetric::with_value("test_counter", 5)));

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.get("test_counter").unwrap(), &json!(5));
    assert_eq!(collector.counter("test_counter"), Some(5));
}

#[test]
fn test_increment_counter() {
    let collector = MetricsCollector::new();
    collector.increment_counter("requests", 1);
    collector.increment_counter("requests", 5);

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.get("requests").unwrap(), &json!(6));
}

#[test]
fn test_increment_registered_counter() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(CounterMetric::with_value("rows", 10)));
    collector.increment_counter("rows", 0);
    collector.increment_counter("rows", 7);
    assert_eq!(collector.counter("rows"), Some(17));
}

#[test]
fn test_missing_counter() {
    let collector = MetricsCollector::new();
    assert_eq!(collector.counter("nope"), None);
}

/// A metric that is not a counter, to check replacement behaviour.
struct Label(&'static str);

impl Metric for Label {
    fn name(&self) -> &str {
        "label"
    }
    fn value(&self) -> Value {
        json!(self.0)
    }
    fn description(&self) -> Option<&str> {
        Some("a fixed string")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_custom_metric_is_not_a_counter() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(Label("hello")));

    assert_eq!(collector.counter("label"), None);
    let json = collector.to_json();
    assert_eq!(json["label"]["value"], json!("hello"));
    assert_eq!(json["label"]["description"], json!("a fixed string"));

    // Incrementing replaces it with a fresh counter.
    collector.increment_counter("label", 2);
    assert_eq!(collector.counter("label"), Some(2));
}

#[test]
fn test_metric_replacement() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(CounterMetric::with_value("metric", 10)));
    collector.register(Box::new(CounterMetric::with_value("metric", 99)));
    assert_eq!(collector.snapshot().len(), 1);
    assert_eq!(collector.counter("metric"), Some(99));
}

#[test]
fn test_metrics_collector_default() {
    let collector = MetricsCollector::default();
    assert!(collector.snapshot().is_empty());
}

#[test]
fn test_metrics_collector_clone_shares_state() {
    let collector1 = MetricsCollector::new();
    let collector2 = collector1.clone();
    collector1.increment_counter("shared", 40);
    collector2.increment_counter("shared", 2);

    assert_eq!(collector1.counter("shared"), Some(42));
    assert_eq!(collector2.counter("shared"), Some(42));
}

#[test]
fn test_elapsed_time() {
    use std::thread;
    use std::time::Duration;

    let collector = MetricsCollector::new();
    assert!(collector.elapsed().is_none());

    collector.record_start();
    assert!(collector.elapsed().is_none());

    thread::sleep(Duration::from_millis(50));
    collector.record_end();

    let elapsed = collector.elapsed();
    assert!(elapsed.is_some());
    assert!(elapsed.unwrap().as_millis() >= 50);
}

#[test]
fn test_to_json_with_execution_time() {
    let collector = MetricsCollector::new();
    collector.register(Box::new(CounterMetric::with_value("test", 42)));
    collector.record_start();
    collector.record_end();

    let json = collector.to_json();
    assert_eq!(json["test"]["value"], json!(42));
    assert!(json["execution_time_ms"]["value"].is_number());
    assert!(
        json["execution_time_ms"]["description"]
            .as_str()
            .unwrap()
            .contains("execution time")
    );
}

#[test]
fn test_to_json_without_execution_time() {
    let collector = MetricsCollector::new();
    collector.increment_counter("count", 100);

    let json = collector.to_json();
    assert_eq!(json["count"]["value"], json!(100));
    assert!(json["count"].get("description").is_none());
    assert!(json.get("execution_time_ms").is_none());
}

#[test]
fn test_print_metrics() {
    let collector = MetricsCollector::new();
    collector.increment_counter("stage0.map.records_in", 3);
    collector.record_start();
    collector.record_end();

    // Just ensure it doesn't panic
    collector.print();
}

#[test]
fn test_save_to_file() {
    use std::fs;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("metrics.json");

    let collector = MetricsCollector::new();
    collector.register(Box::new(CounterMetric::with_value("saved", 123)));
    collector.save_to_file(&file_path).unwrap();

    let contents = fs::read_to_string(&file_path).unwrap();
    let parsed: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["saved"]["value"], json!(123));
}

#[test]
fn test_save_to_missing_directory_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let collector = MetricsCollector::new();
    let err = collector
        .save_to_file(temp_dir.path().join("no/such/dir/metrics.json"))
        .unwrap_err();
    assert!(err.to_string().contains("create"));
}

#[test]
fn test_counter_metric_new() {
    let counter = CounterMetric::new("new_counter");
    assert_eq!(counter.name(), "new_counter");
    assert_eq!(counter.value(), json!(0));
    assert_eq!(counter.count(), 0);
    assert!(counter.description().is_none());
}

#[test]
fn test_counter_metric_with_value() {
    let counter = CounterMetric::with_value("init_counter", 50);
    assert_eq!(counter.name(), "init_counter");
    assert_eq!(counter.value(), json!(50));
}

#[test]
fn test_json_sorted_metrics() {
    let collector = MetricsCollector::new();
    collector.increment_counter("z_last", 1);
    collector.increment_counter("a_first", 2);
    collector.increment_counter("m_middle", 3);

    let names: Vec<String> = collector.snapshot().into_keys().collect();
    assert_eq!(names, vec!["a_first", "m_middle", "z_last"]);
}
