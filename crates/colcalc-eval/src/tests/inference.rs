use crate::engine::Dispatcher;
use colcalc_common::{ArgMeta, DataType, EvalErrorKind, MeasureType, OutputMeta};

fn nominal(dt: DataType) -> ArgMeta {
    ArgMeta::new(dt, MeasureType::Nominal)
}

fn ordinal(dt: DataType) -> ArgMeta {
    ArgMeta::new(dt, MeasureType::Ordinal)
}

fn infer(name: &str, args: &[ArgMeta]) -> OutputMeta {
    Dispatcher::default().infer(name, args).unwrap()
}

#[test]
fn if_follows_its_branches() {
    let out = infer(
        "IF",
        &[nominal(DataType::Integer), nominal(DataType::Text), nominal(DataType::Text)],
    );
    assert_eq!((out.data_type, out.measure), (DataType::Text, MeasureType::Nominal));
    assert_eq!(out.level_sources, vec![1, 2]);

    // no branches supplied: the declared fallback
    let out = infer("IF", &[ArgMeta::continuous(DataType::Decimal)]);
    assert_eq!((out.data_type, out.measure), (DataType::Integer, MeasureType::Nominal));
    assert!(out.level_sources.is_empty());
}

#[test]
fn if_with_mixed_branches_widens() {
    let out = infer(
        "IF",
        &[
            nominal(DataType::Integer),
            ordinal(DataType::Integer),
            ArgMeta::continuous(DataType::Decimal),
        ],
    );
    assert_eq!((out.data_type, out.measure), (DataType::Decimal, MeasureType::Continuous));
}

#[test]
fn recode_takes_values_not_conditions() {
    let args = [
        ArgMeta::continuous(DataType::Decimal),
        nominal(DataType::Integer),
        ordinal(DataType::Integer),
        nominal(DataType::Integer),
        ordinal(DataType::Integer),
    ];
    let out = infer("RECODE", &args);
    assert_eq!((out.data_type, out.measure), (DataType::Integer, MeasureType::Ordinal));
    assert_eq!(out.level_sources, vec![0, 2, 4]);

    let out = infer("_RECODE_NOM", &args[..3]);
    assert_eq!(out.level_sources, vec![0, 2]);
}

#[test]
fn hlookup_ignores_the_index() {
    let out = infer(
        "HLOOKUP",
        &[
            ArgMeta::continuous(DataType::Integer),
            nominal(DataType::Text),
            nominal(DataType::Text),
        ],
    );
    assert_eq!((out.data_type, out.measure), (DataType::Text, MeasureType::Nominal));
    assert_eq!(out.level_sources, vec![1, 2]);
}

#[test]
fn sample_keeps_the_sampled_column_type() {
    let out = infer("SAMPLE", &[ordinal(DataType::Integer), ArgMeta::continuous(DataType::Integer)]);
    assert_eq!((out.data_type, out.measure), (DataType::Integer, MeasureType::Ordinal));
}

#[test]
fn fixed_and_coerced_rules() {
    let text = [nominal(DataType::Text)];
    let out = infer("VALUE", &text);
    assert_eq!(out.data_type, DataType::Decimal);
    let out = infer("DATE", &[ArgMeta::continuous(DataType::Integer)]);
    assert_eq!((out.data_type, out.measure), (DataType::Text, MeasureType::Ordinal));
    let out = infer("VN", &[ArgMeta::continuous(DataType::Decimal)]);
    assert_eq!((out.data_type, out.measure), (DataType::Integer, MeasureType::Ordinal));
    // integer input is bound as decimal, so the inherited type is decimal
    let out = infer("VMEAN", &[ArgMeta::continuous(DataType::Integer)]);
    assert_eq!(out.data_type, DataType::Decimal);
}

#[test]
fn unknown_names_fail_inference() {
    let err = Dispatcher::default().infer("NOSUCH", &[]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Unknown);
}
