use crate::evaluation::AreaCode;

/// The eleven catalog categories and the area letter each maps to.
const CATEGORY_AREAS: &[(&str, AreaCode)] = &[
    ("LEGISLAÇÃO DE TRÁFEGO AÉREO", AreaCode::A),
    ("DOMÍNIO ESPACIAL E USO DOS MEIOS", AreaCode::B),
    ("ORGANIZAÇÃO", AreaCode::C),
    ("COORDENAÇÃO", AreaCode::D),
    ("COMUNICAÇÃO ORAL", AreaCode::E),
    ("INFORMAÇÕES ATS", AreaCode::F),
    ("PLANEJAMENTO", AreaCode::G),
    ("CONTROLE DO TRÁFEGO", AreaCode::H),
    ("EMERGÊNCIA E DEGRADAÇÃO", AreaCode::I),
    ("VIGILÂNCIA ATS", AreaCode::J),
    ("AVALIAÇÃO COMPORTAMENTAL", AreaCode::K),
];

/// Map a catalog category label to its area letter, case-insensitively.
///
/// Unrecognized categories fall back to area A. That imprecision is
/// inherited behavior kept on purpose; callers relying on the fallback
/// should treat it as "uncategorized", not as a real area A entry.
pub fn area_for_category(category: &str) -> AreaCode {
    let wanted = category.trim().to_uppercase();
    CATEGORY_AREAS
        .iter()
        .find(|(label, _)| *label == wanted)
        .map(|(_, area)| *area)
        .unwrap_or(AreaCode::A)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_map_to_their_letters() {
        assert_eq!(area_for_category("COORDENAÇÃO"), AreaCode::D);
        assert_eq!(area_for_category("VIGILÂNCIA ATS"), AreaCode::J);
        assert_eq!(
            area_for_category("AVALIAÇÃO COMPORTAMENTAL"),
            AreaCode::K
        );
    }

    #[test]
    fn lookup_ignores_case_and_surrounding_whitespace() {
        assert_eq!(area_for_category("planejamento"), AreaCode::G);
        assert_eq!(area_for_category("  Controle do Tráfego  "), AreaCode::H);
    }

    #[test]
    fn unrecognized_categories_default_to_area_a() {
        assert_eq!(area_for_category("CATEGORIA INVENTADA"), AreaCode::A);
        assert_eq!(area_for_category(""), AreaCode::A);
    }
}
