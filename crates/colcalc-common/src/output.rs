//! Output metadata: the storage type, measurement level and level sources
//! of a computed column, inferred before any row is evaluated.

use crate::value::{DataType, MeasureType};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A set of argument positions, resolved against the actual argument count
/// of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSet {
    /// Explicit positions, e.g. `[1, 2]` for the two branches of `IF`.
    Indices(&'static [usize]),
    /// `start, start + step, …` up to the last argument.
    Stepped { start: usize, step: usize },
}

impl ArgSet {
    /// Positions that exist in a call with `arg_count` arguments.
    pub fn resolve(&self, arg_count: usize) -> Vec<usize> {
        match *self {
            ArgSet::Indices(ix) => ix.iter().copied().filter(|&i| i < arg_count).collect(),
            ArgSet::Stepped { start, step } => {
                (start..arg_count).step_by(step.max(1)).collect()
            }
        }
    }
}

/// How a function declares the metadata of its result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputRule {
    /// Dominant input storage type, continuous.
    #[default]
    Inherit,
    /// Always this type and level.
    Fixed {
        data_type: DataType,
        measure: MeasureType,
    },
    /// Follow the source arguments when the call supplies any of them,
    /// otherwise fall back to the declared pair.
    FromArgs {
        data_type: DataType,
        measure: MeasureType,
        sources: ArgSet,
    },
}

/// Metadata of one call argument as the engine knows it.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgMeta {
    pub data_type: DataType,
    pub measure: MeasureType,
}

impl ArgMeta {
    pub fn new(data_type: DataType, measure: MeasureType) -> Self {
        Self { data_type, measure }
    }

    pub fn continuous(data_type: DataType) -> Self {
        Self::new(data_type, MeasureType::Continuous)
    }
}

/// Inferred metadata of a result column.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMeta {
    pub data_type: DataType,
    pub measure: MeasureType,
    /// Argument positions whose levels label the result's categories.
    pub level_sources: Vec<usize>,
}

impl OutputRule {
    /// Infer the result metadata for a call whose arguments carry `args`.
    ///
    /// Only argument metadata is consulted, so the result is known before
    /// any row is computed.
    pub fn infer(&self, levels: Option<&ArgSet>, args: &[ArgMeta]) -> OutputMeta {
        let (data_type, measure) = match *self {
            OutputRule::Inherit => {
                let dt = args
                    .iter()
                    .map(|a| a.data_type)
                    .reduce(DataType::widen)
                    .unwrap_or(DataType::Decimal);
                (dt, MeasureType::Continuous)
            }
            OutputRule::Fixed { data_type, measure } => (data_type, measure),
            OutputRule::FromArgs {
                data_type,
                measure,
                sources,
            } => {
                let picked: Vec<ArgMeta> = sources
                    .resolve(args.len())
                    .into_iter()
                    .map(|i| args[i])
                    .collect();
                if picked.is_empty() {
                    (data_type, measure)
                } else {
                    combine(&picked)
                }
            }
        };
        OutputMeta {
            data_type,
            measure,
            level_sources: levels.map(|l| l.resolve(args.len())).unwrap_or_default(),
        }
    }
}

fn combine(sources: &[ArgMeta]) -> (DataType, MeasureType) {
    let dt = sources
        .iter()
        .map(|a| a.data_type)
        .reduce(DataType::widen)
        .unwrap_or(DataType::Decimal);
    let any = |m: MeasureType| sources.iter().any(|a| a.measure == m);

    let measure = if dt == DataType::Decimal {
        MeasureType::Continuous
    } else if any(MeasureType::Continuous) && dt != DataType::Text {
        MeasureType::Continuous
    } else if sources.iter().all(|a| a.measure == MeasureType::Id) {
        MeasureType::Id
    } else if any(MeasureType::Nominal) || any(MeasureType::Id) || dt == DataType::Text {
        MeasureType::Nominal
    } else {
        MeasureType::Ordinal
    };
    (dt, measure)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOM_INT: ArgMeta = ArgMeta {
        data_type: DataType::Integer,
        measure: MeasureType::Nominal,
    };
    const ORD_INT: ArgMeta = ArgMeta {
        data_type: DataType::Integer,
        measure: MeasureType::Ordinal,
    };
    const CONT_DEC: ArgMeta = ArgMeta {
        data_type: DataType::Decimal,
        measure: MeasureType::Continuous,
    };
    const NOM_TEXT: ArgMeta = ArgMeta {
        data_type: DataType::Text,
        measure: MeasureType::Nominal,
    };

    #[test]
    fn stepped_sets_track_argument_count() {
        let s = ArgSet::Stepped { start: 2, step: 2 };
        assert_eq!(s.resolve(7), vec![2, 4, 6]);
        assert_eq!(s.resolve(2), Vec::<usize>::new());
        assert_eq!(ArgSet::Indices(&[0, 2]).resolve(2), vec![0]);
    }

    #[test]
    fn inherit_takes_dominant_type() {
        let m = OutputRule::Inherit.infer(None, &[NOM_INT, CONT_DEC]);
        assert_eq!(m.data_type, DataType::Decimal);
        assert_eq!(m.measure, MeasureType::Continuous);
        assert!(m.level_sources.is_empty());
        let none = OutputRule::Inherit.infer(None, &[]);
        assert_eq!(none.data_type, DataType::Decimal);
    }

    #[test]
    fn from_args_falls_back_without_sources() {
        let rule = OutputRule::FromArgs {
            data_type: DataType::Integer,
            measure: MeasureType::Nominal,
            sources: ArgSet::Indices(&[1, 2]),
        };
        let m = rule.infer(Some(&ArgSet::Indices(&[1, 2])), &[ORD_INT]);
        assert_eq!((m.data_type, m.measure), (DataType::Integer, MeasureType::Nominal));
        assert!(m.level_sources.is_empty());

        let m = rule.infer(Some(&ArgSet::Indices(&[1, 2])), &[ORD_INT, NOM_TEXT, ORD_INT]);
        assert_eq!((m.data_type, m.measure), (DataType::Text, MeasureType::Nominal));
        assert_eq!(m.level_sources, vec![1, 2]);
    }

    #[test]
    fn from_args_measure_combination() {
        let rule = OutputRule::FromArgs {
            data_type: DataType::Decimal,
            measure: MeasureType::Continuous,
            sources: ArgSet::Indices(&[0]),
        };
        let m = rule.infer(None, &[ORD_INT]);
        assert_eq!((m.data_type, m.measure), (DataType::Integer, MeasureType::Ordinal));
        let m = rule.infer(None, &[CONT_DEC]);
        assert_eq!(m.measure, MeasureType::Continuous);
    }
}
