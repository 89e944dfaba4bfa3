//! Allow-list vocabulary for the agriculture domain.
//!
//! Terms are grouped by permitted topic and written in their normalized
//! form. Generic words that are common outside agriculture (`preco`,
//! `mercado`, `maquina`, `tempo`, `dosagem`) are deliberately absent: a
//! question about the price of soybeans still matches on `soja`.

/// Permitted topics and their trigger terms.
pub const VOCABULARY: &[(&str, &[&str])] = &[
    (
        "cultivos",
        &[
            "agricultura", "agricola", "agronomia", "agronomo", "agricultor", "agro",
            "agronegocio", "lavoura", "cultivo", "cultivar", "safra", "safrinha", "plantio",
            "plantar", "colheita", "colher", "semente", "muda", "fazenda", "sitio", "roca",
            "horta", "pomar", "rural", "hectare", "cafe", "cafeeiro", "milho", "soja", "cana",
            "feijao", "arroz", "trigo", "algodao", "mandioca", "laranja", "citro", "banana",
            "uva", "videira", "tomate", "batata", "hortalica", "alface", "cebola", "sorgo",
            "girassol", "eucalipto", "pastagem", "capim", "cacau", "amendoim", "aveia",
            "cevada", "frutifera", "graos",
        ],
    ),
    (
        "solo",
        &[
            "solo", "ph", "npk", "nitrogenio", "fosforo", "potassio", "umidade",
            "salinidade", "acidez", "calcario", "calagem", "nutriente", "micronutriente",
            "boro", "zinco", "enxofre", "magnesio", "calcio", "argila", "arenoso",
            "argiloso", "aluminio", "clorose",
        ],
    ),
    (
        "insumos",
        &[
            "fertilizante", "adubo", "adubacao", "adubar", "ureia", "superfosfato", "kcl",
            "corretivo", "gesso", "defensivo", "agrotoxico", "herbicida", "fungicida",
            "inseticida", "glifosato", "foliar", "bioinsumo",
        ],
    ),
    (
        "irrigacao",
        &[
            "irrigacao", "irrigar", "drenagem", "gotejamento", "aspersao", "microaspersao",
            "pivo", "tensiometro", "outorga",
        ],
    ),
    (
        "fitossanidade",
        &[
            "praga", "doenca", "lagarta", "percevejo", "cigarrinha", "ferrugem", "mildio",
            "antracnose", "fungo", "nematoide", "pulgao", "broca", "bicudo", "daninha",
            "fitossanitario", "inseto",
        ],
    ),
    (
        "mercado",
        &[
            "cotacao", "saca", "arroba", "insumo", "commodity", "cepea", "conab", "esalq",
        ],
    ),
    (
        "clima",
        &[
            "clima", "chuva", "previsao", "geada", "temperatura", "seca", "estiagem",
            "meteorologia", "meteorologico", "granizo", "inmet", "precipitacao",
        ],
    ),
    (
        "maquinas",
        &[
            "trator", "maquinario", "plantadeira", "colheitadeira", "pulverizador",
            "pulverizacao", "implemento", "semeadora", "arado",
        ],
    ),
    (
        "sustentabilidade",
        &[
            "sustentabilidade", "sustentavel", "organico", "organica", "agroecologia",
            "compostagem", "rotacao", "erosao", "embrapa",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::unicode::normalize;

    #[test]
    fn test_terms_are_normalized() {
        for (_, terms) in VOCABULARY {
            for term in *terms {
                assert_eq!(normalize(term), *term, "term not normalized: {term}");
                assert!(!term.contains(' '), "multi-word term: {term}");
            }
        }
    }

    #[test]
    fn test_generic_words_absent() {
        for (_, terms) in VOCABULARY {
            for generic in ["qual", "resultado", "jogo", "futebol", "preco", "tempo"] {
                assert!(!terms.contains(&generic));
            }
        }
    }
}
