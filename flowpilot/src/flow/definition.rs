use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::config::FLOW_DEFAULT_TTL;
use crate::flow::errors::FlowError;
use crate::flow::method::{Method, Transition};
use crate::flow::types::{ActionName, StateName};

/// Immutable flow graph produced by [`FlowBuilder::build`]
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    path: String,
    ttl: Duration,
    initial_state: StateName,
    error_state: StateName,
    end_state: StateName,
    state_order: Vec<StateName>,
    states: HashMap<StateName, Vec<Transition>>,
    clear_on_fatal: Vec<String>,
}

impl FlowDefinition {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn initial_state(&self) -> &StateName {
        &self.initial_state
    }

    pub fn error_state(&self) -> &StateName {
        &self.error_state
    }

    pub fn end_state(&self) -> &StateName {
        &self.end_state
    }

    /// Declared states in declaration order
    pub fn states(&self) -> &[StateName] {
        &self.state_order
    }

    pub fn has_state(&self, state: &StateName) -> bool {
        self.states.contains_key(state)
    }

    /// Transitions legal in `state`, or `None` for an undeclared state
    pub fn transitions(&self, state: &StateName) -> Option<&[Transition]> {
        self.states.get(state).map(Vec::as_slice)
    }

    pub fn find_transition(&self, state: &StateName, action: &ActionName) -> Option<&Transition> {
        self.transitions(state)?
            .iter()
            .find(|transition| transition.name() == action)
    }

    /// Stash paths removed when a method fails fatally
    pub fn clear_on_fatal(&self) -> &[String] {
        &self.clear_on_fatal
    }
}

/// Fluent builder for a [`FlowDefinition`]
///
/// ```rust,ignore
/// let flow = FlowBuilder::new("/login")
///     .ttl(Duration::from_secs(600))
///     .state(LOGIN_INIT)
///     .method(ContinueWithLoginIdentifier::new(directory))
///     .state(SUCCESS)
///     .state(ERROR)
///     .fixed_states(LOGIN_INIT, ERROR, SUCCESS)
///     .build()?;
/// ```
#[derive(Default)]
pub struct FlowBuilder {
    path: String,
    ttl: Option<Duration>,
    initial_state: Option<StateName>,
    error_state: Option<StateName>,
    end_state: Option<StateName>,
    states: Vec<(StateName, Vec<Arc<dyn Method>>)>,
    clear_on_fatal: Vec<String>,
    problems: Vec<String>,
}

impl FlowBuilder {
    /// Starts a flow available under `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Declares a state; following [`method`](Self::method) calls attach to it
    pub fn state(mut self, state: StateName) -> Self {
        if self.states.iter().any(|(declared, _)| declared == &state) {
            self.problems.push(format!("state {state} declared more than once"));
        }
        self.states.push((state, Vec::new()));
        self
    }

    /// Adds a method to the most recently declared state
    pub fn method(mut self, method: impl Method) -> Self {
        match self.states.last_mut() {
            Some((_, methods)) => methods.push(Arc::new(method)),
            None => self.problems.push(format!(
                "method {} added before any state was declared",
                method.name()
            )),
        }
        self
    }

    /// Adds several already shared methods to the most recently declared state
    pub fn methods(mut self, methods: impl IntoIterator<Item = Arc<dyn Method>>) -> Self {
        for method in methods {
            match self.states.last_mut() {
                Some((_, declared)) => declared.push(method),
                None => self.problems.push(format!(
                    "method {} added before any state was declared",
                    method.name()
                )),
            }
        }
        self
    }

    pub fn fixed_states(
        mut self,
        initial_state: StateName,
        error_state: StateName,
        end_state: StateName,
    ) -> Self {
        self.initial_state = Some(initial_state);
        self.error_state = Some(error_state);
        self.end_state = Some(end_state);
        self
    }

    /// Stash paths cleared when a method fails fatally and the flow enters the error state
    pub fn clear_on_fatal<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clear_on_fatal.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<FlowDefinition, FlowError> {
        let definition_error = |msg: String| {
            tracing::error!("Rejecting flow definition {}: {}", self.path, msg);
            FlowError::Definition(format!("{}: {}", self.path, msg))
        };

        if let Some(problem) = self.problems.first() {
            return Err(definition_error(problem.clone()));
        }

        let (Some(initial_state), Some(error_state), Some(end_state)) = (
            self.initial_state.clone(),
            self.error_state.clone(),
            self.end_state.clone(),
        ) else {
            return Err(definition_error(
                "initial, error and end states must be set".to_string(),
            ));
        };

        let ttl = self
            .ttl
            .unwrap_or_else(|| Duration::from_secs(*FLOW_DEFAULT_TTL));
        if ttl.is_zero() {
            return Err(definition_error("ttl must be greater than zero".to_string()));
        }

        let declared: HashSet<&StateName> = self.states.iter().map(|(state, _)| state).collect();
        for (role, state) in [
            ("initial", &initial_state),
            ("error", &error_state),
            ("end", &end_state),
        ] {
            if !declared.contains(state) {
                return Err(definition_error(format!(
                    "{role} state {state} is not declared"
                )));
            }
        }

        let mut states = HashMap::with_capacity(self.states.len());
        let mut state_order = Vec::with_capacity(self.states.len());
        for (state, methods) in &self.states {
            if state == &end_state && !methods.is_empty() {
                return Err(definition_error(format!(
                    "end state {state} must not have outgoing transitions"
                )));
            }

            let mut names: BTreeSet<&ActionName> = BTreeSet::new();
            let transitions: Vec<Transition> = methods
                .iter()
                .map(|method| Transition::from_method(Arc::clone(method)))
                .collect();

            for transition in &transitions {
                if !names.insert(transition.name()) {
                    return Err(definition_error(format!(
                        "action {} declared twice in state {state}",
                        transition.name()
                    )));
                }
                if let Some(target) = transition
                    .allowed_targets()
                    .iter()
                    .find(|target| !declared.contains(target))
                {
                    return Err(definition_error(format!(
                        "action {} in state {state} targets undeclared state {target}",
                        transition.name()
                    )));
                }
            }

            state_order.push(state.clone());
            states.insert(state.clone(), transitions);
        }

        tracing::debug!(
            "Built flow definition {} with {} states",
            self.path,
            state_order.len()
        );

        Ok(FlowDefinition {
            path: self.path.clone(),
            ttl,
            initial_state,
            error_state,
            end_state,
            state_order,
            states,
            clear_on_fatal: self.clear_on_fatal.clone(),
        })
    }
}
