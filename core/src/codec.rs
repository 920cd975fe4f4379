//! Category codec: label tuples to compact numeric tuples and back.
//!
//! Each hierarchy owns a leading-digit namespace:
//!
//! | digit | native prefix | hierarchy      |
//! |-------|---------------|----------------|
//! | 1     | `DOID_`       | disease        |
//! | 2     | `DISDRIV_`    | disease driver |
//! | 3     | `CHEBI_`      | disease driver |
//! | 4     | `ExO_`        | disease driver |
//! | 5     | `NCIT_C`      | disease driver |
//! | 6     | `SYMP_`       | symptom        |
//! | 7     | `TRANS_`      | transmission   |
//!
//! `compact` swaps the native prefix for the digit, `expand` swaps it
//! back and resolves the label through the taxonomy service.

use crate::{
    error::{CodecLookupError, SimResult},
    payload::{CompactSet, Payload},
    taxonomy::{Hierarchy, LabelSet, Namespace, Taxonomy, TermCode},
};
use std::sync::Arc;

fn namespace_digit(namespace: Namespace) -> char {
    match namespace {
        Namespace::Doid    => '1',
        Namespace::Disdriv => '2',
        Namespace::Chebi   => '3',
        Namespace::Exo     => '4',
        Namespace::Ncit    => '5',
        Namespace::Symp    => '6',
        Namespace::Trans   => '7',
    }
}

fn namespace_for_digit(digit: char) -> Option<Namespace> {
    Namespace::ALL.into_iter().find(|ns| namespace_digit(*ns) == digit)
}

/// Rewrite one native code into its compact integer.
pub fn encode_term(code: &TermCode) -> Result<u32, CodecLookupError> {
    let text = format!("{}{}", namespace_digit(code.namespace), code.local_id);
    text.parse::<u32>()
        .map_err(|_| CodecLookupError::MalformedCode { value: code.to_string() })
}

/// Inverse of `encode_term`.
pub fn decode_term(value: u32) -> Result<TermCode, CodecLookupError> {
    let text = value.to_string();
    let mut chars = text.chars();
    let namespace = chars
        .next()
        .and_then(namespace_for_digit)
        .ok_or_else(|| CodecLookupError::MalformedCode { value: text.clone() })?;
    TermCode::new(namespace, chars.as_str())
}

#[derive(Clone)]
pub struct CategoryCodec {
    taxonomy: Arc<dyn Taxonomy>,
}

impl CategoryCodec {
    pub fn new(taxonomy: Arc<dyn Taxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Arc<dyn Taxonomy> {
        &self.taxonomy
    }

    pub fn compact(&self, labels: &LabelSet) -> SimResult<CompactSet> {
        let mut values = [0u32; 4];
        for (slot, hierarchy) in values.iter_mut().zip(Hierarchy::ALL) {
            let code = self.taxonomy.label_to_code(hierarchy, labels.get(hierarchy))?;
            *slot = encode_term(&code)?;
        }
        let [disease, driver, symptom, transmission] = values;
        Ok(CompactSet { disease, driver, symptom, transmission })
    }

    pub fn expand(&self, set: &CompactSet) -> SimResult<LabelSet> {
        let mut labels: [String; 4] = Default::default();
        for ((slot, hierarchy), value) in labels.iter_mut().zip(Hierarchy::ALL).zip(set.values()) {
            let code = decode_term(value)?;
            let actual = code.namespace.hierarchy();
            if actual != hierarchy {
                return Err(CodecLookupError::WrongHierarchy {
                    value,
                    expected: hierarchy,
                    actual,
                }
                .into());
            }
            *slot = self.taxonomy.code_to_label(&code)?;
        }
        let [disease, driver, symptom, transmission] = labels;
        Ok(LabelSet { disease, driver, symptom, transmission })
    }

    /// Compacted form of any payload. Already-compacted payloads pass through.
    pub fn compact_payload(&self, payload: &Payload) -> SimResult<Payload> {
        match payload {
            Payload::Expanded(labels) => Ok(Payload::Compacted(self.compact(labels)?)),
            Payload::Compacted(_) => Ok(payload.clone()),
        }
    }

    /// Expanded form of any payload. Already-expanded payloads pass through.
    pub fn expand_payload(&self, payload: &Payload) -> SimResult<Payload> {
        match payload {
            Payload::Compacted(set) => Ok(Payload::Expanded(self.expand(set)?)),
            Payload::Expanded(_) => Ok(payload.clone()),
        }
    }
}
