pub const CT_SCAN_LABELS: [&str; 3] = ["Adenocarcinoma", "Benign", "Squamous Cell Carcinoma"];

pub const HISTOPATHOLOGY_LABELS: [&str; 4] = [
    "Lung adenocarcinoma",
    "Lung benign Tissue",
    "Lung squamous cell carcinoma",
    "none",
];

pub fn label(table: &'static [&'static str], index: usize) -> Option<&'static str> {
    table.get(index).copied()
}
