use std::sync::Arc;

use crate::Effect;

/// Pure transition function `(Action, &mut State, &Environment) -> Effect`.
///
/// Reducers compose by projection ([`Reducer::pullback`]) and by running a
/// list of them against the same action ([`Reducer::combine`]).
pub struct Reducer<A, S, E> {
    run: Arc<dyn Fn(A, &mut S, &E) -> Effect<A> + Send + Sync>,
}

impl<A, S, E> Clone for Reducer<A, S, E> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<A, S, E> Reducer<A, S, E>
where
    A: Send + 'static,
    S: 'static,
    E: 'static,
{
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(A, &mut S, &E) -> Effect<A> + Send + Sync + 'static,
    {
        Self { run: Arc::new(run) }
    }

    pub fn empty() -> Self {
        Self::new(|_, _, _| Effect::empty())
    }

    pub fn reduce(&self, action: A, state: &mut S, environment: &E) -> Effect<A> {
        (self.run)(action, state, environment)
    }

    /// Runs every reducer in order against the same action. State mutations
    /// are visible to later reducers; effects are concatenated.
    pub fn combine(reducers: impl IntoIterator<Item = Self>) -> Self
    where
        A: Clone,
    {
        let reducers: Vec<Self> = reducers.into_iter().collect();
        Self::new(move |action: A, state: &mut S, environment: &E| {
            let mut effect = Effect::empty();
            for reducer in &reducers {
                effect = effect.combine(reducer.reduce(action.clone(), state, environment));
            }
            effect
        })
    }

    /// Lifts this reducer into a parent domain.
    ///
    /// The lifted reducer is a no-op whenever `extract` rejects the action or
    /// `state` finds no child state; returned effects are re-targeted with `embed`.
    pub fn pullback<PA, PS, PE, X, M, G, P>(
        self,
        extract: X,
        embed: M,
        state: G,
        environment: P,
    ) -> Reducer<PA, PS, PE>
    where
        PA: Send + 'static,
        PS: 'static,
        PE: 'static,
        X: Fn(PA) -> Option<A> + Send + Sync + 'static,
        M: Fn(A) -> PA + Clone + Send + Sync + 'static,
        G: for<'a> Fn(&'a mut PS) -> Option<&'a mut S> + Send + Sync + 'static,
        P: Fn(&PE) -> E + Send + Sync + 'static,
    {
        Reducer::new(move |action: PA, parent: &mut PS, parent_env: &PE| {
            let Some(action) = extract(action) else {
                return Effect::empty();
            };
            let Some(child) = state(parent) else {
                return Effect::empty();
            };
            let child_env = environment(parent_env);
            self.reduce(action, child, &child_env).map(embed.clone())
        })
    }
}
