//! TF-IDF bag-of-words vectorizer for the semantic retrieval factor.
//!
//! Fit fresh on every query over the candidate texts plus the query itself,
//! so the vocabulary always reflects what is actually being compared.
//!
//!   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//!   w(t, d) = tf(t, d) · idf(t), L2-normalised per document
//!
//! Tokens are lowercase words of at least two characters, minus English
//! stop words. The vocabulary is capped at `max_features` most frequent terms.

use std::collections::{HashMap, HashSet};

use crate::text::{is_stop_word, tokenize};

/// A fitted vocabulary with inverse document frequencies.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// Sparse, L2-normalised document vector.
#[derive(Debug, Clone, Default)]
pub struct TermVector {
    weights: HashMap<usize, f64>,
}

impl TermVector {
    /// Cosine similarity with another normalised vector, in `[0, 1]`.
    #[must_use]
    pub fn cosine(&self, other: &Self) -> f64 {
        let (small, large) = if self.weights.len() <= other.weights.len() {
            (self, other)
        } else {
            (other, self)
        };
        let dot: f64 = small
            .weights
            .iter()
            .filter_map(|(term, w)| large.weights.get(term).map(|v| w * v))
            .sum();
        if dot.is_finite() { dot.clamp(0.0, 1.0) } else { 0.0 }
    }

    /// Whether no vocabulary term occurs in the document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    tokenize(text).filter(|t| t.chars().count() >= 2 && !is_stop_word(t))
}

impl TfIdfVectorizer {
    /// Fit over a corpus. Returns `None` when the corpus yields no terms
    /// at all (empty texts, only stop words, ...).
    #[must_use]
    pub fn fit<'a, I>(documents: I, max_features: usize) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut term_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u64> = HashMap::new();
        let mut n_docs = 0_u64;

        for doc in documents {
            n_docs += 1;
            let mut seen: HashSet<String> = HashSet::new();
            for term in terms(doc) {
                *term_counts.entry(term.clone()).or_default() += 1;
                seen.insert(term);
            }
            for term in seen {
                *doc_freq.entry(term).or_default() += 1;
            }
        }

        if term_counts.is_empty() || max_features == 0 {
            return None;
        }

        let mut ranked: Vec<(String, u64)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n = n_docs as f64;
        let mut vocabulary = HashMap::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (index, (term, _)) in ranked.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Some(Self { vocabulary, idf })
    }

    /// Number of terms in the fitted vocabulary.
    #[must_use]
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Project a document into the fitted space.
    #[must_use]
    pub fn transform(&self, text: &str) -> TermVector {
        let mut weights: HashMap<usize, f64> = HashMap::new();
        for term in terms(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *weights.entry(index).or_default() += 1.0;
            }
        }
        for (index, w) in &mut weights {
            *w *= self.idf[*index];
        }
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > f64::EPSILON {
            for w in weights.values_mut() {
                *w /= norm;
            }
        } else {
            weights.clear();
        }
        TermVector { weights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_have_unit_similarity() {
        let docs = ["project deadline stress", "family dinner joy"];
        let v = TfIdfVectorizer::fit(docs, 1000).expect("non-empty vocabulary");
        let a = v.transform("project deadline stress");
        assert!((a.cosine(&a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_texts_have_zero_similarity() {
        let docs = ["project deadline", "family dinner"];
        let v = TfIdfVectorizer::fit(docs, 1000).expect("non-empty vocabulary");
        assert_eq!(v.transform("project deadline").cosine(&v.transform("family dinner")), 0.0);
    }

    #[test]
    fn shared_terms_rank_above_unrelated() {
        let docs = [
            "worried about the project deadline",
            "the project went well",
            "we had a family dinner",
        ];
        let v = TfIdfVectorizer::fit(docs, 1000).expect("non-empty vocabulary");
        let q = v.transform("worried about the project deadline");
        let related = q.cosine(&v.transform(docs[1]));
        let unrelated = q.cosine(&v.transform(docs[2]));
        assert!(related > unrelated);
    }

    #[test]
    fn stop_words_only_cannot_be_fit() {
        assert!(TfIdfVectorizer::fit(["the and of", "a I"], 1000).is_none());
        assert!(TfIdfVectorizer::fit(std::iter::empty::<&str>(), 1000).is_none());
    }

    #[test]
    fn repeated_terms_count_once_per_document() {
        let v = TfIdfVectorizer::fit(["alpha alpha alpha", "beta"], 1000).expect("fit");
        let both = v.transform("alpha beta");
        let expected = std::f64::consts::FRAC_1_SQRT_2;
        assert!((both.cosine(&v.transform("alpha")) - expected).abs() < 1e-9);
        assert!((both.cosine(&v.transform("beta")) - expected).abs() < 1e-9);
    }

    #[test]
    fn vocabulary_is_capped_to_most_frequent() {
        let v = TfIdfVectorizer::fit(["alpha alpha alpha beta beta gamma"], 2).expect("fit");
        assert_eq!(v.vocabulary_len(), 2);
        assert!(v.transform("gamma").is_empty());
        assert!(!v.transform("alpha").is_empty());
    }
}
