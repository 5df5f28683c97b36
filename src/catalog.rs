//! Static catalog of the canonical contract variables an operator can browse
//! and insert into a clause body.

use once_cell::sync::Lazy;
use strsim::damerau_levenshtein;

/// Edit distance at or under which a name counts as a likely typo of a
/// catalog entry.
const TYPO_DISTANCE: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct VariableCatalogEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

static CATALOG: Lazy<Vec<VariableCatalogEntry>> = Lazy::new(|| {
    vec![
        VariableCatalogEntry {
            name: "Nombre Cliente",
            category: "Partes",
            description: "Nombre completo del cliente",
        },
        VariableCatalogEntry {
            name: "DNI Cliente",
            category: "Partes",
            description: "Documento de identidad del cliente",
        },
        VariableCatalogEntry {
            name: "Representante Legal",
            category: "Partes",
            description: "Nombre del abogado responsable",
        },
        VariableCatalogEntry {
            name: "Área de Práctica",
            category: "Contrato",
            description: "Área de práctica legal",
        },
        VariableCatalogEntry {
            name: "Valor Honorarios",
            category: "Financiero",
            description: "Monto total de honorarios",
        },
        VariableCatalogEntry {
            name: "Modalidad Pago",
            category: "Financiero",
            description: "Forma de pago acordada",
        },
        VariableCatalogEntry {
            name: "Valor Penalidad",
            category: "Financiero",
            description: "Valor de penalidad por incumplimiento",
        },
        VariableCatalogEntry {
            name: "Fecha Inicio",
            category: "Fechas",
            description: "Fecha de inicio del contrato",
        },
        VariableCatalogEntry {
            name: "Fecha Fin",
            category: "Fechas",
            description: "Fecha de finalización del contrato",
        },
        VariableCatalogEntry {
            name: "Ciudad Firma",
            category: "Ubicación",
            description: "Ciudad donde se firma el contrato",
        },
        VariableCatalogEntry {
            name: "Ciudad Notificación",
            category: "Ubicación",
            description: "Ciudad para notificaciones judiciales",
        },
    ]
});

/// All catalog entries, in display order.
pub fn entries() -> &'static [VariableCatalogEntry] {
    &CATALOG
}

/// Case-insensitive substring filter over entry name and category, used by
/// the catalog browser.
pub fn filter(term: &str) -> Vec<&'static VariableCatalogEntry> {
    let needle = term.to_lowercase();
    CATALOG
        .iter()
        .filter(|entry| {
            entry.name.to_lowercase().contains(&needle)
                || entry.category.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Whether `name` is one of the canonical catalog variables.
pub fn is_standard(name: &str) -> bool {
    CATALOG.iter().any(|entry| entry.name == name)
}

/// Closest catalog name within the typo threshold, if any. Comparison is
/// case-insensitive so `nombre cliente` still maps to `Nombre Cliente`.
pub fn suggest(name: &str) -> Option<&'static str> {
    let lowered = name.to_lowercase();
    CATALOG
        .iter()
        .map(|entry| (entry.name, damerau_levenshtein(&lowered, &entry.name.to_lowercase())))
        .filter(|(_, distance)| *distance <= TYPO_DISTANCE)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_name_case_insensitive() {
        let hits = filter("fecha");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|e| e.name == "Fecha Inicio"));
        assert!(hits.iter().any(|e| e.name == "Fecha Fin"));
    }

    #[test]
    fn test_filter_by_category() {
        let hits = filter("FINANCIERO");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_filter_empty_term_returns_everything() {
        assert_eq!(filter("").len(), entries().len());
    }

    #[test]
    fn test_is_standard_exact_match_only() {
        assert!(is_standard("Ciudad Firma"));
        assert!(!is_standard("ciudad firma"));
        assert!(!is_standard("Ciudad"));
    }

    #[test]
    fn test_suggest_catches_typos() {
        assert_eq!(suggest("Nombre Clinete"), Some("Nombre Cliente"));
        assert_eq!(suggest("fecha inico"), Some("Fecha Inicio"));
    }

    #[test]
    fn test_suggest_ignores_distant_names() {
        assert_eq!(suggest("Numero Expediente"), None);
        assert_eq!(suggest(""), None);
    }
}
