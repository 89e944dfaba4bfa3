//! Built-in agronomy knowledge base.
//!
//! The text asset is split on `=== TITLE ===` headings; each heading's slug
//! selects the keyword list used for lookup.

use crate::error::{KnowledgeError, Result};
use crate::io::unicode::normalize;
use crate::knowledge::section::KnowledgeSection;
use regex::Regex;

/// Version tag of the bundled knowledge text.
pub const BUILTIN_VERSION: &str = "2024.1";

/// Bundled knowledge text.
pub const BUILTIN_TEXT: &str = include_str!("../../assets/knowledge_base.txt");

/// Lookup keywords for each bundled section, in declaration order.
const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "analise-de-solo",
        &[
            "solo", "ph", "acidez", "acido", "alcalino", "calagem", "calcario", "npk",
            "nitrogenio", "fosforo", "potassio", "umidade", "deficiencia", "clorose",
            "amarelecimento", "analise", "correcao", "aluminio", "murcha", "cafe", "milho",
            "soja", "cana", "feijao", "hortalica", "nutriente",
        ],
    ),
    (
        "produtos-e-marcas",
        &[
            "fertilizante", "adubo", "adubacao", "ureia", "sulfato", "nitrato",
            "superfosfato", "map", "dap", "kcl", "cloreto", "termofosfato", "corretivo",
            "gesso", "formula", "npk", "marca", "produto", "yara", "mosaic", "heringer",
            "icl", "haifa", "yoorin", "dose", "dosagem", "nitrogenado", "fosfatado",
            "potassico", "foliar",
        ],
    ),
    (
        "irrigacao",
        &[
            "irrigacao", "irrigar", "gotejamento", "microaspersao", "aspersao", "aspersor",
            "pivo", "agua", "tensiometro", "umidade", "kpa", "netafim", "irritec",
            "plastro", "carborundum", "drenagem", "seca", "rega",
        ],
    ),
    (
        "pragas-e-doencas",
        &[
            "praga", "doenca", "lagarta", "spodoptera", "helicoverpa", "percevejo",
            "cigarrinha", "ferrugem", "mildio", "antracnose", "fungo", "fungicida",
            "inseticida", "defensivo", "controle", "bayer", "syngenta", "corteva", "basf",
            "fitossanitario", "inseto",
        ],
    ),
    (
        "precos-medios-referencia",
        &[
            "preco", "custo", "cotacao", "mercado", "saca", "tonelada", "reais", "valor",
            "insumo", "glifosato", "venda", "vender", "comprar", "cepea", "conab",
        ],
    ),
    (
        "boas-praticas",
        &[
            "pratica", "rotacao", "cobertura", "plantio", "manejo", "monitoramento",
            "registro", "erosao", "calagem", "sustentabilidade", "sustentavel", "organica",
            "conservacao",
        ],
    ),
    (
        "fontes-oficiais",
        &[
            "fonte", "embrapa", "conab", "cepea", "esalq", "inmet", "mapa", "legislacao",
            "pesquisa", "oficial", "referencia",
        ],
    ),
];

/// Parses the bundled knowledge text into sections.
///
/// # Errors
///
/// Returns an error if the text has no headings.
pub fn builtin_sections() -> Result<Vec<KnowledgeSection>> {
    parse_sections(BUILTIN_TEXT, keywords_for)
}

/// Splits heading-delimited knowledge text into sections.
///
/// # Arguments
///
/// * `text` - Knowledge text with `=== TITLE ===` headings.
/// * `keywords` - Maps a section slug to its keyword list.
///
/// # Errors
///
/// Returns an error if no heading is found.
pub fn parse_sections<F>(text: &str, keywords: F) -> Result<Vec<KnowledgeSection>>
where
    F: Fn(&str) -> &'static [&'static str],
{
    let heading = Regex::new(r"(?m)^===\s*(.+?)\s*===\s*$").map_err(KnowledgeError::from)?;

    let headings: Vec<_> = heading
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(1)?;
            Some((whole.start(), whole.end(), title.as_str().to_string()))
        })
        .collect();

    if headings.is_empty() {
        return Err(KnowledgeError::Parse("no '=== TITLE ===' headings found".to_string()).into());
    }

    let sections = headings
        .iter()
        .enumerate()
        .map(|(i, (_, body_start, title))| {
            let body_end = headings.get(i + 1).map_or(text.len(), |next| next.0);
            let id = slugify(title);
            let body = text[*body_start..body_end].trim().to_string();
            KnowledgeSection::new(id.clone(), title.clone(), keywords(&id).iter(), body)
        })
        .collect();

    Ok(sections)
}

/// Returns the bundled keyword list for a slug (empty when unknown).
fn keywords_for(slug: &str) -> &'static [&'static str] {
    KEYWORDS
        .iter()
        .find(|(id, _)| *id == slug)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Turns a heading into a lowercase, dash-separated identifier.
fn slugify(title: &str) -> String {
    normalize(title)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
