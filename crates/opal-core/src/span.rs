pub type FileId = u64;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Span {
    pub file: FileId,
    pub lo: u32,
    pub hi: u32,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Span({}:{}-{})", self.file, self.lo, self.hi)
    }
}

impl Span {
    pub fn new(file: FileId, lo: u32, hi: u32) -> Span {
        Span { file, lo, hi }
    }

    /// The absent span. Generated nodes carry it until a later pass
    /// attributes them to a source location.
    pub fn null() -> Span {
        Span::default()
    }

    pub fn is_null(&self) -> bool {
        *self == Span::default()
    }

    /// Smallest span covering every non-null span in the iterator.
    /// Spans from different files do not merge; the first file wins.
    pub fn union(spans: impl IntoIterator<Item = Span>) -> Span {
        spans
            .into_iter()
            .filter(|span| !span.is_null())
            .fold(Span::null(), |acc, span| {
                if acc.is_null() {
                    span
                } else if acc.file != span.file {
                    acc
                } else {
                    Span::new(acc.file, acc.lo.min(span.lo), acc.hi.max(span.hi))
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_all_spans() {
        let merged = Span::union([Span::new(1, 4, 9), Span::new(1, 2, 5), Span::new(1, 8, 12)]);
        assert_eq!(merged, Span::new(1, 2, 12));
    }

    #[test]
    fn union_skips_null_spans() {
        let merged = Span::union([Span::null(), Span::new(3, 1, 2), Span::null()]);
        assert_eq!(merged, Span::new(3, 1, 2));
        assert!(Span::union([]).is_null());
    }
}
