//! Text normalization, similarity scoring and pattern rules for header
//! mapping

/// Built-in fallback table: well-known header spellings and their column ids.
/// Consulted after the persisted store, before any fuzzy matching.
pub const FALLBACK_HEADER_IDS: &[(&str, &str)] = &[
    ("Mark & Nº", "col_static"),
    ("P.O Nº", "col_po"),
    ("ITEM Nº", "col_item"),
    ("Description", "col_desc"),
    ("Quantity", "col_qty_sf"),
    ("Unit price", "col_unit_price"),
    ("Amount", "col_amount"),
    ("PCS", "col_qty_pcs"),
    ("SF", "col_qty_sf"),
    ("N.W (KGS)", "col_net"),
    ("G.W (KGS)", "col_gross"),
    ("CBM", "col_cbm"),
    ("HS CODE", "col_hs_code"),
    ("Pallet Nº", "col_pallet"),
];

/// Normalize header text for matching: case-fold, fold the numero sign,
/// strip punctuation, collapse whitespace
pub fn normalize_header(text: &str) -> String {
    let lowered = text.to_lowercase().replace('º', "o").replace('°', "o");
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if ch.is_whitespace() || ch.is_ascii_punctuation() {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character-frequency overlap ratio in [0, 1]
pub fn char_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mut counts_a = std::collections::HashMap::new();
    for ch in a.chars() {
        *counts_a.entry(ch).or_insert(0usize) += 1;
    }
    let mut counts_b = std::collections::HashMap::new();
    for ch in b.chars() {
        *counts_b.entry(ch).or_insert(0usize) += 1;
    }
    let matches: usize = counts_a
        .iter()
        .map(|(ch, count)| counts_b.get(ch).copied().unwrap_or(0).min(*count))
        .sum();
    (2.0 * matches as f64) / (a.chars().count() + b.chars().count()) as f64
}

/// Word-overlap ratio in [0, 1] over normalized token sets
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let shared = tokens_a.intersection(&tokens_b).count();
    (2.0 * shared as f64) / (tokens_a.len() + tokens_b.len()) as f64
}

/// Combined fuzzy score: words dominate, characters refine
pub fn fuzzy_score(a: &str, b: &str) -> f64 {
    fuzzy_score_normalized(&normalize_header(a), &normalize_header(b))
}

/// Score two texts already passed through [`normalize_header`]
pub fn fuzzy_score_normalized(a: &str, b: &str) -> f64 {
    0.7 * token_similarity(a, b) + 0.3 * char_similarity(a, b)
}

/// Multi-word pattern rules: a column id matches when any of its word sets is
/// fully present in the normalized header, in any order
struct PatternRule {
    id: &'static str,
    word_sets: &'static [&'static [&'static str]],
}

const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        id: "col_static",
        word_sets: &[&["mark", "no"], &["mark", "note"]],
    },
    PatternRule {
        id: "col_po",
        word_sets: &[&["po", "no"], &["p", "o", "no"], &["purchase", "order"]],
    },
    PatternRule {
        id: "col_item",
        word_sets: &[&["item", "no"], &["item"]],
    },
    PatternRule {
        id: "col_desc",
        word_sets: &[&["description"], &["desc"]],
    },
    PatternRule {
        id: "col_qty_pcs",
        word_sets: &[&["pcs"]],
    },
    PatternRule {
        id: "col_qty_sf",
        word_sets: &[&["quantity"], &["qty"], &["sf"]],
    },
    PatternRule {
        id: "col_unit_price",
        word_sets: &[&["unit", "price"], &["price"]],
    },
    PatternRule {
        id: "col_amount",
        word_sets: &[&["amount"], &["total"]],
    },
    PatternRule {
        id: "col_net",
        word_sets: &[&["n", "w", "kgs"], &["nw", "kgs"], &["net", "weight"]],
    },
    PatternRule {
        id: "col_gross",
        word_sets: &[&["g", "w", "kgs"], &["gw", "kgs"], &["gross", "weight"]],
    },
    PatternRule {
        id: "col_cbm",
        word_sets: &[&["cbm"]],
    },
    PatternRule {
        id: "col_hs_code",
        word_sets: &[&["hs", "code"], &["hscode"]],
    },
    PatternRule {
        id: "col_pallet",
        word_sets: &[&["pallet", "no"], &["pallet"]],
    },
];

/// Match a header against the pattern rules, first hit wins
pub fn pattern_match(text: &str) -> Option<&'static str> {
    let normalized = normalize_header(text);
    let tokens: std::collections::HashSet<&str> = normalized.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    for rule in PATTERN_RULES {
        for word_set in rule.word_sets {
            if word_set.iter().all(|w| tokens.contains(w)) {
                return Some(rule.id);
            }
        }
    }
    None
}

/// Exact lookup in the built-in fallback table
pub fn fallback_lookup(text: &str) -> Option<&'static str> {
    FALLBACK_HEADER_IDS
        .iter()
        .find(|(raw, _)| *raw == text)
        .map(|(_, id)| *id)
}
