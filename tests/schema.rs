//! Tests for schema declaration and the line codec.

use anyhow::Result;
use std::sync::Arc;
use tabreduce::{Layout, Record, RecordSchema, StageError};

#[test]
fn round_trip_exact_arity() -> Result<()> {
    let schema = RecordSchema::declare(["a", "b", "c"], ["a", "b", "c"])?;
    for line in ["x\ty\tz", "1\t\t3", "\t\t", "with space\t-7.5\tlast"] {
        let rec = schema.decode(line);
        assert_eq!(schema.encode(&rec), line);
    }
    Ok(())
}

#[test]
fn decode_strips_one_terminator() -> Result<()> {
    let schema = RecordSchema::declare(["k", "v"], ["k", "v"])?;
    let rec = schema.decode("key\tvalue\r\n");
    assert_eq!(rec.cells(), ["key", "value"]);

    let rec = schema.decode("key\tvalue\n");
    assert_eq!(rec.field("v"), Some("value"));
    Ok(())
}

#[test]
fn short_line_pads_with_empty_cells() -> Result<()> {
    let schema = RecordSchema::declare(["a", "b", "c"], ["a", "b", "c"])?;
    let rec = schema.decode("only");
    assert_eq!(rec.len(), 3);
    assert_eq!(rec.cell(0), "only");
    assert_eq!(rec.cell(1), "");
    assert_eq!(rec.field("c"), Some(""));
    assert_eq!(schema.encode(&rec), "only\t\t");
    Ok(())
}

#[test]
fn extra_columns_are_ignored() -> Result<()> {
    let schema = RecordSchema::declare(["a", "b"], ["a", "b"])?;
    let rec = schema.decode("1\t2\t3\t4");
    assert_eq!(rec.cells(), ["1", "2"]);
    assert_eq!(schema.encode(&rec), "1\t2");
    Ok(())
}

#[test]
fn encode_projects_output_fields_by_name() -> Result<()> {
    let schema = RecordSchema::declare(["ip", "path", "bytes"], ["bytes", "ip", "agent"])?;
    let rec = schema.decode("10.0.0.1\t/index\t512");
    // Input-shaped record: projected by name, undeclared `agent` left empty.
    assert_eq!(schema.encode(&rec), "512\t10.0.0.1\t");
    Ok(())
}

#[test]
fn encode_trims_trailing_terminators_per_cell() -> Result<()> {
    let schema = RecordSchema::declare(["a"], ["a", "b"])?;
    let mut out = schema.new_output();
    out.set(0, "left\r\n");
    out.set(1, "right\n\n");
    assert_eq!(schema.encode(&out), "left\tright");
    Ok(())
}

#[test]
fn custom_separators() -> Result<()> {
    let schema = RecordSchema::declare(["a", "b"], ["b", "a"])?
        .field_separator(",")?
        .emit_separator(" | ")?;
    assert_eq!(schema.in_sep(), ",");
    assert_eq!(schema.out_sep(), " | ");

    let rec = schema.decode("1,2");
    assert_eq!(schema.encode(&rec), "2 | 1");
    Ok(())
}

#[test]
fn empty_separator_is_a_configuration_error() -> Result<()> {
    let schema = RecordSchema::declare(["a"], ["a"])?;
    let err = schema.clone().field_separator("").unwrap_err();
    assert!(matches!(err, StageError::Configuration(_)));
    let err = schema.emit_separator("").unwrap_err();
    assert!(matches!(err, StageError::Configuration(_)));
    Ok(())
}

#[test]
fn duplicate_field_names_rejected() {
    let err = RecordSchema::declare(["a", "b", "a"], ["a"]).unwrap_err();
    assert!(matches!(err, StageError::Configuration(ref m) if m.contains("`a`")));

    assert!(RecordSchema::declare(["a"], ["x", "x"]).is_err());
}

#[test]
fn embedded_separator_does_not_round_trip() -> Result<()> {
    let schema = RecordSchema::declare(["a", "b"], ["a", "b"])?;
    let mut out = schema.new_output();
    out.set(0, "has\ttab");
    out.set(1, "x");
    let line = schema.encode(&out);
    assert_eq!(line, "has\ttab\tx");
    assert_ne!(schema.decode(&line).cells(), out.cells());
    Ok(())
}

#[test]
fn record_access_by_name_and_position() -> Result<()> {
    let layout = Arc::new(Layout::new(["key", "count"])?);
    let mut rec = Record::from_cells(Arc::clone(&layout), ["k1", " 42 "]);

    assert_eq!(rec.require("key")?, "k1");
    assert_eq!(rec.int(1)?, 42);
    assert!(matches!(rec.require("nope"), Err(StageError::UnknownField(_))));

    rec.set_field("count", 7)?;
    assert_eq!(rec.get(1), Some("7"));
    assert!(rec.set_field("missing", 1).is_err());

    // Fixed arity: writes past the end are dropped.
    rec.set(5, "ignored");
    assert_eq!(rec.len(), 2);
    assert_eq!(rec.get(5), None);
    assert_eq!(rec.cell(5), "");
    Ok(())
}

#[test]
fn copy_from_skips_leading_cells() -> Result<()> {
    let src = RecordSchema::declare(["s0", "c0", "c1"], ["c0", "c1"])?;
    let rec = src.decode("drop\tkeep1\tkeep2");
    let mut out = src.new_output();
    out.copy_from(&rec, 1);
    assert_eq!(out.cells(), ["keep1", "keep2"]);
    Ok(())
}

#[test]
fn numeric_cells_fail_with_kind() -> Result<()> {
    let schema = RecordSchema::declare(["n"], ["n"])?;
    let rec = schema.decode("abc");
    let err = rec.int(0).unwrap_err();
    assert_eq!(err.text, "abc");
    assert_eq!(err.kind, tabreduce::NumericKind::Integer);

    assert!(schema.decode("").float(0).is_err());
    assert!(schema.decode("NaN").float(0).is_err());
    assert_eq!(schema.decode("2.5").float(0)?, 2.5);
    Ok(())
}
