//! Memoized selectors
//!
//! A selector is a pure, read-only projection of state. [`Memoized`] splits a
//! projection into two steps:
//!
//! 1. an **input** function that picks a slice of state (cheap: usually an
//!    `Arc` clone or a `Copy` field), and
//! 2. a **project** function that derives the output from that slice.
//!
//! The last input and last output are cached. When the next input is the same
//! slice (per [`Identity`], which compares `Arc`s by pointer), the cached
//! output is returned without calling `project`. Outputs that are themselves
//! `Arc`s are therefore pointer-stable across calls while their slice is
//! unchanged.
//!
//! # Example
//!
//! ```
//! use roster_core::selector::{create_selector, Selector};
//! use std::sync::Arc;
//!
//! struct State {
//!     names: Arc<[String]>,
//! }
//!
//! let count = create_selector(|s: &State| Arc::clone(&s.names), |names| names.len());
//!
//! let state = State { names: Arc::from(vec!["ada".to_string()]) };
//! assert_eq!(count.select(&state), 1);
//! assert_eq!(count.select(&state), 1);
//! assert_eq!(count.recomputations(), 1);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Cheap "is this the same value" comparison used for memoization keys
///
/// Shared data compares by pointer; plain values compare by value.
pub trait Identity {
    /// Returns true if `self` and `other` are the same slice of state
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<A: Identity, B: Identity> Identity for (A, B) {
    fn same(&self, other: &Self) -> bool {
        self.0.same(&other.0) && self.1.same(&other.1)
    }
}

impl<A: Identity, B: Identity, C: Identity> Identity for (A, B, C) {
    fn same(&self, other: &Self) -> bool {
        self.0.same(&other.0) && self.1.same(&other.1) && self.2.same(&other.2)
    }
}

macro_rules! identity_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_by_value!(bool, u8, u16, u32, u64, usize, i32, i64, String, &'static str);

/// A read-only projection of state
pub trait Selector<S>: Send + Sync {
    /// The derived value
    type Output: Clone;

    /// Compute (or return the cached) output for `state`
    fn select(&self, state: &S) -> Self::Output;
}

type InputFn<S, I> = Box<dyn Fn(&S) -> I + Send + Sync>;
type ProjectFn<I, O> = Box<dyn Fn(&I) -> O + Send + Sync>;

/// Selector with a single-entry "last input / last output" cache
pub struct Memoized<S, I, O> {
    input: InputFn<S, I>,
    project: ProjectFn<I, O>,
    cache: Mutex<Option<(I, O)>>,
    recomputations: AtomicUsize,
}

impl<S, I, O> Memoized<S, I, O>
where
    S: 'static,
    I: Identity + Clone + Send + 'static,
    O: Clone + Send + 'static,
{
    /// Build a selector from an input slice function and a projection
    #[must_use]
    pub fn new<F, P>(input: F, project: P) -> Self
    where
        F: Fn(&S) -> I + Send + Sync + 'static,
        P: Fn(&I) -> O + Send + Sync + 'static,
    {
        Self {
            input: Box::new(input),
            project: Box::new(project),
            cache: Mutex::new(None),
            recomputations: AtomicUsize::new(0),
        }
    }

    /// Number of times the projection actually ran
    #[must_use]
    pub fn recomputations(&self) -> usize {
        self.recomputations.load(Ordering::Relaxed)
    }

    /// Drop the cached input/output pair
    pub fn reset(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Derive a new selector whose input is this selector's output
    ///
    /// The parent keeps its own cache, so a chain only recomputes the links
    /// whose input actually changed.
    #[must_use]
    pub fn compose<O2, P>(self: &Arc<Self>, project: P) -> Memoized<S, O, O2>
    where
        O: Identity,
        O2: Clone + Send + 'static,
        P: Fn(&O) -> O2 + Send + Sync + 'static,
    {
        let parent = Arc::clone(self);
        Memoized::new(move |state: &S| parent.select(state), project)
    }
}

impl<S, I, O> Selector<S> for Memoized<S, I, O>
where
    S: 'static,
    I: Identity + Clone + Send + 'static,
    O: Clone + Send + 'static,
{
    type Output = O;

    fn select(&self, state: &S) -> O {
        let input = (self.input)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((last_input, last_output)) = cache.as_ref() {
            if last_input.same(&input) {
                return last_output.clone();
            }
        }

        let output = (self.project)(&input);
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *cache = Some((input, output.clone()));
        output
    }
}

impl<S, I, O> std::fmt::Debug for Memoized<S, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoized")
            .field("recomputations", &self.recomputations.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<S, T: Selector<S> + ?Sized> Selector<S> for Arc<T> {
    type Output = T::Output;

    fn select(&self, state: &S) -> Self::Output {
        (**self).select(state)
    }
}

/// Shorthand for [`Memoized::new`]
#[must_use]
pub fn create_selector<S, I, O, F, P>(input: F, project: P) -> Memoized<S, I, O>
where
    S: 'static,
    I: Identity + Clone + Send + 'static,
    O: Clone + Send + 'static,
    F: Fn(&S) -> I + Send + Sync + 'static,
    P: Fn(&I) -> O + Send + Sync + 'static,
{
    Memoized::new(input, project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct State {
        items: Arc<[u32]>,
        busy: bool,
    }

    fn state(items: &[u32]) -> State {
        State {
            items: Arc::from(items),
            busy: false,
        }
    }

    #[test]
    fn cached_output_is_pointer_stable() {
        let sorted = create_selector(
            |s: &State| Arc::clone(&s.items),
            |items| {
                let mut v = items.to_vec();
                v.sort_unstable();
                Arc::<[u32]>::from(v)
            },
        );

        let s = state(&[3, 1, 2]);
        let first = sorted.select(&s);
        let second = sorted.select(&s);

        assert_eq!(&*first, &[1, 2, 3]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(sorted.recomputations(), 1);
    }

    #[test]
    fn recomputes_when_slice_changes() {
        let total = create_selector(|s: &State| Arc::clone(&s.items), |items| items.iter().sum::<u32>());

        let s1 = state(&[1, 2]);
        assert_eq!(total.select(&s1), 3);

        // Unrelated field change keeps the slice
        let s2 = State { busy: true, ..s1.clone() };
        assert_eq!(total.select(&s2), 3);
        assert_eq!(total.recomputations(), 1);

        // Equal contents, new allocation: recomputed (identity, not equality)
        let s3 = state(&[1, 2]);
        assert_eq!(total.select(&s3), 3);
        assert_eq!(total.recomputations(), 2);
    }

    #[test]
    fn value_slices_compare_by_value() {
        let busy = create_selector(|s: &State| s.busy, |busy| *busy);
        let s = state(&[]);
        assert!(!busy.select(&s));
        assert!(!busy.select(&state(&[9])));
        assert_eq!(busy.recomputations(), 1);
    }

    #[test]
    fn composed_selectors_chain_caches() {
        let items = Arc::new(create_selector(|s: &State| Arc::clone(&s.items), Arc::clone));
        let count = items.compose(|items| items.len());

        let s = state(&[4, 5, 6]);
        assert_eq!(count.select(&s), 3);
        assert_eq!(count.select(&s), 3);
        assert_eq!(items.recomputations(), 1);
        assert_eq!(count.recomputations(), 1);
    }

    #[test]
    fn reset_forces_recomputation() {
        let len = create_selector(|s: &State| Arc::clone(&s.items), |items| items.len());
        let s = state(&[1]);
        len.select(&s);
        len.reset();
        len.select(&s);
        assert_eq!(len.recomputations(), 2);
    }

    #[test]
    fn option_identity() {
        let a: Option<Arc<str>> = Some(Arc::from("x"));
        let b = a.clone();
        let c: Option<Arc<str>> = Some(Arc::from("x"));
        assert!(a.same(&b));
        assert!(!a.same(&c));
        assert!(None::<Arc<str>>.same(&None));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn memoized_matches_direct_projection(
                slices in prop::collection::vec(prop::collection::vec(0u32..100, 0..6), 1..10),
                repeats in 1usize..4,
            ) {
                let total = create_selector(|s: &State| Arc::clone(&s.items), |items| items.iter().sum::<u32>());

                for slice in &slices {
                    let s = state(slice);
                    for _ in 0..repeats {
                        prop_assert_eq!(total.select(&s), slice.iter().sum::<u32>());
                    }
                }
                prop_assert_eq!(total.recomputations(), slices.len());
            }
        }
    }
}
