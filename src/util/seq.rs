use serde::{Deserialize, Serialize};

/// 核酸字符占比达到该阈值即视为核酸序列（允许少量 IUPAC 简并碱基）
pub const NUCLEOTIDE_FRACTION: f64 = 0.9;

/// 查询序列类型：决定用 blastn 还是 tblastn 搜索
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceKind {
    Nucleotide,
    Protein,
}

impl SequenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SequenceKind::Nucleotide => "nucleotide",
            SequenceKind::Protein => "protein",
        }
    }
}

impl std::fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[inline]
pub fn is_nucleotide_base(b: u8) -> bool {
    matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'U' | b'N')
}

#[inline]
fn is_gap(b: u8) -> bool {
    matches!(b, b'-' | b'*' | b'.')
}

/// 根据残基组成判断序列类型。空序列（或只有 gap）按核酸处理。
pub fn detect_kind(seq: &[u8]) -> SequenceKind {
    let mut total = 0usize;
    let mut nucl = 0usize;
    for &b in seq {
        if is_gap(b) || b.is_ascii_whitespace() {
            continue;
        }
        total += 1;
        if is_nucleotide_base(b) {
            nucl += 1;
        }
    }
    if total == 0 || nucl as f64 / total as f64 >= NUCLEOTIDE_FRACTION {
        SequenceKind::Nucleotide
    } else {
        SequenceKind::Protein
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna_and_rna_are_nucleotide() {
        assert_eq!(detect_kind(b"ACGTACGTNN"), SequenceKind::Nucleotide);
        assert_eq!(detect_kind(b"acguacgu"), SequenceKind::Nucleotide);
        assert_eq!(detect_kind(b""), SequenceKind::Nucleotide);
    }

    #[test]
    fn protein_residues_are_detected() {
        assert_eq!(detect_kind(b"MKVLAAGIVGLLLAQ"), SequenceKind::Protein);
        // A/C/G/T also occur in proteins, but not at this density
        assert_eq!(detect_kind(b"MAGTCKW"), SequenceKind::Protein);
    }

    #[test]
    fn few_ambiguity_codes_stay_nucleotide() {
        // 1 R out of 20 residues
        assert_eq!(detect_kind(b"ACGTACGTACGTACGTACGR"), SequenceKind::Nucleotide);
        assert_eq!(detect_kind(b"ACGT--ACGT"), SequenceKind::Nucleotide);
    }
}
