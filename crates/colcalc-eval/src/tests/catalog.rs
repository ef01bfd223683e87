use crate::function::EvalMode;
use crate::function_registry;

const ROW_WISE: &[&str] = &[
    "ABS", "BETA", "BOXCOX", "CEILING", "CONTAINS", "COUNT", "DATE", "DATEVALUE", "EXP",
    "FILTER", "FLOOR", "GAMMA", "HLOOKUP", "IF", "IFMISS", "IIQR", "INT", "LN", "LOG10", "MATCH",
    "MAX", "MEAN", "MIN", "NORM", "NOT", "NOTROW", "RECODE", "ROUND", "ROW", "SPLIT", "SQRT",
    "STDEV", "SUM", "TEXT", "UNIF", "VALUE", "VAR", "_FILTER",
];

const COLUMN_WISE: &[&str] = &[
    "Q1", "Q3", "RANK", "VBOXCOXLAMBDA", "VMAD", "VMADR", "VMAX", "VMEAN", "VMED", "VMIN",
    "VMODE", "VN", "VROWS", "VSE", "VSTDEV", "VSUM", "VVAR",
];

#[test]
fn every_builtin_is_registered_in_its_mode() {
    function_registry::load_builtins();
    for (names, mode) in [(ROW_WISE, EvalMode::RowWise), (COLUMN_WISE, EvalMode::ColumnWise)] {
        for name in names {
            let d = function_registry::descriptor(name)
                .unwrap_or_else(|| panic!("{name} is not registered"));
            assert_eq!(d.mode, mode, "{name}");
        }
    }
    let sample = function_registry::descriptor("SAMPLE").unwrap();
    assert_eq!(sample.mode, EvalMode::ColumnWiseNoGroupBy);
}

#[test]
fn only_random_functions_are_volatile() {
    function_registry::load_builtins();
    let volatile: Vec<String> = function_registry::names()
        .into_iter()
        .filter(|n| function_registry::descriptor(n).is_some_and(|d| d.is_volatile()))
        .collect();
    assert_eq!(volatile, ["BETA", "GAMMA", "NORM", "SAMPLE", "UNIF"]);
}

#[test]
fn arities_are_consistent() {
    function_registry::load_builtins();
    for name in function_registry::names() {
        let d = function_registry::descriptor(&name).unwrap();
        if let Some(max) = d.max_args {
            assert!(d.min_args <= max, "{name}: {} > {max}", d.min_args);
        }
        assert!(d.keywords().all(|k| !k.is_empty()), "{name}");
    }
    let contains = function_registry::descriptor("CONTAINS").unwrap();
    assert_eq!(contains.keywords().count(), 8);
    assert_eq!((contains.min_args, contains.max_args), (2, None));
    let row = function_registry::descriptor("ROW").unwrap();
    assert_eq!((row.min_args, row.max_args), (0, Some(0)));
}

#[test]
fn recode_aliases_share_one_descriptor() {
    function_registry::load_builtins();
    for alias in ["_RECODE_NOM", "_RECODE_ORD", "_RECODE_CONT", "_RECODE_ID", "recode"] {
        let d = function_registry::descriptor(alias).unwrap();
        assert_eq!(d.name, "RECODE");
    }
}
