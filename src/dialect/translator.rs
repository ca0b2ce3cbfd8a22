use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{RdsRsError, Result};
use crate::types::{Argument, Parameter};

static ORDINAL_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?").expect("ordinal placeholder pattern is valid"));

/// A query rewritten into named-placeholder form with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    pub sql: String,
    pub parameters: Vec<Parameter>,
}

/// Rewrite `query` and `args` into the named form the remote service expects.
///
/// Ordinal arguments are renamed to their stringified position and every `?`
/// in the query becomes `{prefix}1`, `{prefix}2`, ... counted left to right.
/// Named arguments pass through with the query text untouched. Mixing the two
/// styles is rejected.
pub fn translate(query: &str, args: &[Argument], prefix: char) -> Result<TranslatedQuery> {
    let named = args.iter().any(|a| matches!(a, Argument::Named { .. }));
    let ordinal = args.iter().any(|a| matches!(a, Argument::Ordinal { .. }));
    if named && ordinal {
        return Err(RdsRsError::MixedParameterStyle);
    }

    let parameters = to_parameters(args)?;

    if !ordinal {
        return Ok(TranslatedQuery {
            sql: query.to_string(),
            parameters,
        });
    }

    let mut idx = 0usize;
    let sql = ORDINAL_PLACEHOLDER
        .replace_all(query, |_: &Captures<'_>| {
            idx += 1;
            format!("{prefix}{idx}")
        })
        .into_owned();

    Ok(TranslatedQuery { sql, parameters })
}

fn to_parameters(args: &[Argument]) -> Result<Vec<Parameter>> {
    let mut seen = HashSet::with_capacity(args.len());
    args.iter()
        .map(|arg| {
            let name = match arg {
                Argument::Named { name, .. } if name.is_empty() => {
                    return Err(RdsRsError::InvalidArgument(
                        "named argument with an empty name".to_string(),
                    ))
                }
                Argument::Named { name, .. } => name.clone(),
                Argument::Ordinal { position: 0, .. } => {
                    return Err(RdsRsError::InvalidArgument(
                        "ordinal positions start at 1".to_string(),
                    ))
                }
                Argument::Ordinal { position, .. } => position.to_string(),
            };
            if !seen.insert(name.clone()) {
                return Err(RdsRsError::DuplicateParameter(name));
            }
            Ok(Parameter::new(name, arg.value().clone()))
        })
        .collect()
}
