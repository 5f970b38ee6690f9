// src/services/listing.rs
//
// Filtros de igualdade das listagens ("Todos" = sem filtro).

use std::collections::BTreeSet;

/// Filtro vazio, ausente ou "Todos" aceita qualquer valor.
pub fn matches(filter: Option<&str>, value: &str) -> bool {
    match filter.map(str::trim) {
        None | Some("") | Some("Todos") => true,
        Some(wanted) => wanted == value.trim(),
    }
}

/// Valores distintos e ordenados, sem vazios (opções dos filtros).
pub fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
