//! Fixed lookup table of the 27 Brazilian federative units.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Code → full name pairs, sorted by code.
pub const STATE_NAMES: [(&str, &str); 27] = [
    ("AC", "Acre"),
    ("AL", "Alagoas"),
    ("AM", "Amazonas"),
    ("AP", "Amapá"),
    ("BA", "Bahia"),
    ("CE", "Ceará"),
    ("DF", "Distrito Federal"),
    ("ES", "Espírito Santo"),
    ("GO", "Goiás"),
    ("MA", "Maranhão"),
    ("MG", "Minas Gerais"),
    ("MS", "Mato Grosso do Sul"),
    ("MT", "Mato Grosso"),
    ("PA", "Pará"),
    ("PB", "Paraíba"),
    ("PE", "Pernambuco"),
    ("PI", "Piauí"),
    ("PR", "Paraná"),
    ("RJ", "Rio de Janeiro"),
    ("RN", "Rio Grande do Norte"),
    ("RO", "Rondônia"),
    ("RR", "Roraima"),
    ("RS", "Rio Grande do Sul"),
    ("SC", "Santa Catarina"),
    ("SE", "Sergipe"),
    ("SP", "São Paulo"),
    ("TO", "Tocantins"),
];

static STATE_LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| STATE_NAMES.iter().copied().collect());

/// Full name for a state code, if the code is one of the 27 known units.
pub fn state_name(code: &str) -> Option<&'static str> {
    STATE_LOOKUP.get(code).copied()
}
