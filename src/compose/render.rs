//! Rendering of individual context sources into slot text.

use crate::compose::slot::{ContextSlot, SlotName};
use crate::core::{ConversationTurn, FarmerRecord};
use crate::knowledge::KnowledgeExcerpt;

/// Shown in place of any unknown farmer field.
pub const UNKNOWN_VALUE: &str = "nao informado";

/// Separator between knowledge excerpts.
pub const EXCERPT_DELIMITER: &str = "\n---\n";

/// Renders the farmer record with a fixed field order.
#[must_use]
pub fn farmer_slot(record: Option<&FarmerRecord>) -> ContextSlot {
    let Some(record) = record else {
        return ContextSlot::absent(SlotName::Farmer);
    };

    let soil = &record.soil;
    let lines = [
        format!("- Propriedade: {}", text_or_unknown(record.property_name.as_deref())),
        format!("- Area: {}", number_or_unknown(record.area_ha, " ha")),
        format!("- Cultura atual: {}", text_or_unknown(record.current_crop.as_deref())),
        format!("- pH do solo: {}", number_or_unknown(soil.ph, "")),
        format!("- Nitrogenio (N): {}", number_or_unknown(soil.n, " mg/kg")),
        format!("- Fosforo (P): {}", number_or_unknown(soil.p, " mg/kg")),
        format!("- Potassio (K): {}", number_or_unknown(soil.k, " mg/kg")),
        format!("- Umidade do solo: {}", number_or_unknown(soil.moisture, "%")),
    ];

    ContextSlot::filled(SlotName::Farmer, lines.join("\n"))
}

/// Renders knowledge excerpts in the given (score) order.
#[must_use]
pub fn knowledge_slot(excerpts: &[KnowledgeExcerpt]) -> ContextSlot {
    if excerpts.is_empty() {
        return ContextSlot::absent(SlotName::Knowledge);
    }

    let text = excerpts
        .iter()
        .map(|excerpt| format!("### {}\n{}", excerpt.title, excerpt.text))
        .collect::<Vec<_>>()
        .join(EXCERPT_DELIMITER);

    ContextSlot::filled(SlotName::Knowledge, text)
}

/// Passes free text through verbatim, or the placeholder when blank.
#[must_use]
pub fn text_slot(name: SlotName, text: Option<&str>) -> ContextSlot {
    match text {
        Some(text) if !text.trim().is_empty() => ContextSlot::filled(name, text),
        _ => ContextSlot::absent(name),
    }
}

/// Renders turns as role-labeled lines, oldest first.
#[must_use]
pub fn history_slot(turns: &[ConversationTurn]) -> ContextSlot {
    if turns.is_empty() {
        return ContextSlot::absent(SlotName::History);
    }

    let text = turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n");

    ContextSlot::filled(SlotName::History, text)
}

fn text_or_unknown(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN_VALUE,
    }
}

fn number_or_unknown(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v}{unit}"),
        _ => UNKNOWN_VALUE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Role, SoilReadings};

    #[test]
    fn test_farmer_values_verbatim() {
        let record = FarmerRecord::named("Fazenda Boa Vista")
            .with_crop("Soja")
            .with_soil(SoilReadings {
                ph: Some(5.2),
                ..SoilReadings::default()
            });
        let slot = farmer_slot(Some(&record));
        assert!(slot.present);
        assert!(slot.text.contains("Fazenda Boa Vista"));
        assert!(slot.text.contains("Soja"));
        assert!(slot.text.contains("pH do solo: 5.2"));
        assert!(slot.text.contains("- Area: nao informado"));
    }

    #[test]
    fn test_farmer_field_order() {
        let slot = farmer_slot(Some(&FarmerRecord::default()));
        let labels: Vec<_> = slot
            .text
            .lines()
            .map(|line| line.split(':').next().unwrap_or_default())
            .collect();
        assert_eq!(
            labels,
            vec![
                "- Propriedade",
                "- Area",
                "- Cultura atual",
                "- pH do solo",
                "- Nitrogenio (N)",
                "- Fosforo (P)",
                "- Potassio (K)",
                "- Umidade do solo",
            ]
        );
    }

    #[test]
    fn test_farmer_units() {
        let record = FarmerRecord::named("Sitio").with_area(12.5).with_soil(SoilReadings {
            n: Some(90.0),
            moisture: Some(38.0),
            ..SoilReadings::default()
        });
        let slot = farmer_slot(Some(&record));
        assert!(slot.text.contains("- Area: 12.5 ha"));
        assert!(slot.text.contains("- Nitrogenio (N): 90 mg/kg"));
        assert!(slot.text.contains("- Umidade do solo: 38%"));
    }

    #[test]
    fn test_absent_farmer() {
        let slot = farmer_slot(None);
        assert!(!slot.present);
        assert_eq!(slot.text, SlotName::Farmer.placeholder());
    }

    #[test]
    fn test_knowledge_rendering() {
        let excerpts = vec![
            KnowledgeExcerpt {
                section_id: "a".into(),
                title: "ANALISE DE SOLO".into(),
                score: 2,
                text: "pH 6.0".into(),
                truncated: false,
            },
            KnowledgeExcerpt {
                section_id: "b".into(),
                title: "IRRIGACAO".into(),
                score: 1,
                text: "Gotejamento".into(),
                truncated: false,
            },
        ];
        let slot = knowledge_slot(&excerpts);
        assert_eq!(
            slot.text,
            "### ANALISE DE SOLO\npH 6.0\n---\n### IRRIGACAO\nGotejamento"
        );
    }

    #[test]
    fn test_blank_text_is_absent() {
        assert!(!text_slot(SlotName::Web, Some("  \n")).present);
        assert!(!text_slot(SlotName::Web, None).present);
        let slot = text_slot(SlotName::Weather, Some("28C, sem chuva"));
        assert_eq!(slot.text, "28C, sem chuva");
    }

    #[test]
    fn test_history_labels() {
        let turns = vec![
            ConversationTurn::at(Role::User, "Quando plantar?", 1),
            ConversationTurn::at(Role::Assistant, "Em outubro.", 2),
        ];
        let slot = history_slot(&turns);
        assert_eq!(slot.text, "Usuario: Quando plantar?\nEkko: Em outubro.");
    }
}
