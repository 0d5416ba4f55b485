//! Error type for the decomposition core.
//!
//! Every fallible operation in [`crate::graph`] and [`crate::decomp`] returns
//! [`DecompError`]. A failure is fatal to the single decomposition call that
//! raised it; the input graph is consumed by that call, so there is no shared
//! state left half-written.

/// Errors raised while building or decomposing a graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecompError {
    /// A node reached during computation lacks a required attribute.
    ///
    /// Raised for `conc` during the tie stages and for `betweenness` /
    /// `clustering` during the correlation stage. Never defaulted silently:
    /// a missing value points at an upstream graph-construction bug.
    #[error("node '{node}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        node: String,
        attribute: &'static str,
    },

    /// An edge weight is negative, NaN or infinite.
    #[error("edge '{ego}' -> '{alter}' has invalid weight {weight}")]
    InvalidWeight {
        ego: String,
        alter: String,
        weight: f64,
    },

    /// A node attribute value is NaN or infinite.
    #[error("node '{node}' has invalid {attribute} value {value}")]
    InvalidAttribute {
        node: String,
        attribute: &'static str,
        value: f64,
    },

    /// An edge or lookup referenced a label that is not in the graph.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// The same label was declared twice as a node.
    #[error("duplicate node '{0}'")]
    DuplicateNode(String),

    /// A document used the same id both as an integer and as a string.
    #[error("node id '{0}' appears both as an integer and as a string")]
    AmbiguousNodeId(String),

    /// A tie-strength method name did not parse.
    #[error(
        "unknown tie-strength method '{0}' (expected one of: equal, freq, freqExp, rand, randExp, revRandExp)"
    )]
    UnknownTieStrength(String),

    /// `Ci` disagrees with the sum of its components beyond tolerance.
    #[error("constraint identity violated at node '{node}': residual {residual:e}")]
    IdentityViolation { node: String, residual: f64 },
}

impl DecompError {
    /// Shorthand for [`DecompError::MissingAttribute`].
    pub fn missing(node: impl Into<String>, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            node: node.into(),
            attribute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_message_names_node_and_attribute() {
        let err = DecompError::missing("n7", "conc");
        assert_eq!(
            err.to_string(),
            "node 'n7' is missing required attribute 'conc'"
        );
    }

    #[test]
    fn invalid_weight_message() {
        let err = DecompError::InvalidWeight {
            ego: "a".to_string(),
            alter: "b".to_string(),
            weight: -1.0,
        };
        assert!(err.to_string().contains("'a' -> 'b'"));
        assert!(err.to_string().contains("-1"));
    }
}
