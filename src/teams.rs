use std::collections::HashMap;
use std::sync::LazyLock;

pub const TEAM_ALIASES: &[(&str, &str)] = &[
    ("Bahía", "Bahia"),
    ("Brasília", "Brasilia"),
    ("Athletico Paranaense", "Atlético Paranaense"),
    ("Paranaense", "Atlético Paranaense"),
    ("Táchira", "Deportivo Táchira"),
    ("Mineiro", "Atlético Mineiro"),
    ("Goianiense", "Atlético Goianiense"),
    ("Cali", "Deportivo Cali"),
    ("Capiatá", "Deportivo Capiatá"),
    ("Tucumán", "Atlético Tucumán"),
    ("Medellín", "Independiente Medellín"),
    ("Estudiantes", "Estudiantes (LP)"),
];

static ALIAS_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| TEAM_ALIASES.iter().copied().collect());

pub fn normalize_team_name(raw: &str) -> String {
    let trimmed = raw.trim();
    ALIAS_TABLE
        .get(trimmed)
        .copied()
        .unwrap_or(trimmed)
        .to_string()
}
