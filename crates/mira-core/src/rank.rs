use crate::release::ReleaseAsset;

/// Weighted substring terms used to score artifact names.
///
/// Terms are matched against the lowercased name; every matching term adds its
/// weight once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermWeights {
    terms: Vec<(String, u32)>,
}

impl TermWeights {
    #[must_use]
    pub fn new<S: Into<String>>(terms: impl IntoIterator<Item = (S, u32)>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|(term, weight)| (term.into().to_lowercase(), weight))
                .collect(),
        }
    }

    /// Build a table from a priority list where earlier terms weigh more: the
    /// term at index `i` of `n` gets `(n - i) * 10`.
    #[must_use]
    pub fn from_priority(terms: &[&str]) -> Self {
        let count = terms.len();
        Self::new(terms.iter().enumerate().map(|(index, term)| {
            let weight = u32::try_from((count - index) * 10).unwrap_or(u32::MAX);
            (*term, weight)
        }))
    }

    #[must_use]
    pub fn score(&self, name: &str) -> u32 {
        let lower = name.to_lowercase();
        self.terms
            .iter()
            .filter(|(term, _)| lower.contains(term.as_str()))
            .map(|(_, weight)| *weight)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn weight_of(&self, term: &str) -> Option<u32> {
        let term = term.to_lowercase();
        self.terms
            .iter()
            .find(|(candidate, _)| *candidate == term)
            .map(|(_, weight)| *weight)
    }
}

/// Pick the highest-scoring asset. Equal scores go to the larger file; when
/// size also ties, the earliest candidate wins.
#[must_use]
pub fn choose_best<'a>(
    assets: &[&'a ReleaseAsset],
    weights: &TermWeights,
) -> Option<&'a ReleaseAsset> {
    let mut best: Option<(&'a ReleaseAsset, u32)> = None;

    for &asset in assets {
        let score = weights.score(&asset.name);
        let replace = match best {
            None => true,
            Some((current, current_score)) => {
                (score, asset.size_bytes) > (current_score, current.size_bytes)
            }
        };
        if replace {
            best = Some((asset, score));
        }
    }

    best.map(|(asset, _)| asset)
}
