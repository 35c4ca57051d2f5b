//! In-memory model of the host's visual-scripting machines.
//!
//! The host engine owns machines built from named states, each holding an
//! ordered action list, plus a variable table shared across the machine.
//! This crate models just enough of that shape for the mod core to address
//! the fields it overwrites. Handles are `Rc<RefCell<Fsm>>` because every
//! host callback runs on the single update thread.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared reference to a live machine instance.
pub type FsmHandle = Rc<RefCell<Fsm>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsmError {
    #[error("machine {machine:?} has no state named {state:?}")]
    MissingState { machine: String, state: String },
    #[error("state {state:?} of machine {machine:?} has no action at index {index}")]
    MissingAction {
        machine: String,
        state: String,
        index: usize,
    },
    #[error(
        "action {index} in state {state:?} of machine {machine:?} is {found}, expected {expected}"
    )]
    ActionKindMismatch {
        machine: String,
        state: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("machine {machine:?} has no {kind} variable named {name:?}")]
    MissingVariable {
        machine: String,
        kind: &'static str,
        name: String,
    },
}

/// Destination a raised event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTarget {
    /// The machine that raised the event.
    SelfMachine,
    /// Every machine on the owning object.
    Broadcast,
}

/// One configured step inside a state.
///
/// Only the parameter shapes the mod overwrites are modelled; everything
/// else the host executes is [`Action::Opaque`], where only presence in the
/// list matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Compares a machine variable against a literal threshold.
    IntCompare { variable: String, compare_to: i64 },
    /// Writes a literal into a named variable on a target machine.
    SetInt { target_variable: String, value: i64 },
    /// Raises a named event.
    SendEvent {
        target: EventTarget,
        event: String,
        delay: f32,
        every_frame: bool,
    },
    /// Host action the mod never touches.
    Opaque { name: String },
}

impl Action {
    pub fn opaque(name: impl Into<String>) -> Self {
        Action::Opaque { name: name.into() }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::IntCompare { .. } => "int_compare",
            Action::SetInt { .. } => "set_int",
            Action::SendEvent { .. } => "send_event",
            Action::Opaque { .. } => "opaque",
        }
    }
}

/// Named state holding an ordered action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    pub actions: Vec<Action>,
}

/// Int and bool variables shared across one machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    ints: BTreeMap<String, i64>,
    bools: BTreeMap<String, bool>,
}

impl VariableTable {
    pub fn define_int(&mut self, name: impl Into<String>, value: i64) {
        self.ints.insert(name.into(), value);
    }

    pub fn define_bool(&mut self, name: impl Into<String>, value: bool) {
        self.bools.insert(name.into(), value);
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.ints.get(name).copied()
    }

    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }

    /// Overwrites an existing int variable; returns false when undefined.
    pub fn set_int(&mut self, name: &str, value: i64) -> bool {
        match self.ints.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Overwrites an existing bool variable; returns false when undefined.
    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        match self.bools.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// A single machine instance: the object it lives on, its name, its states,
/// and its variable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fsm {
    pub object_name: String,
    pub fsm_name: String,
    pub states: Vec<State>,
    pub variables: VariableTable,
}

impl Fsm {
    pub fn new(object_name: impl Into<String>, fsm_name: impl Into<String>) -> Self {
        Fsm {
            object_name: object_name.into(),
            fsm_name: fsm_name.into(),
            states: Vec::new(),
            variables: VariableTable::default(),
        }
    }

    pub fn into_handle(self) -> FsmHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn add_state(&mut self, name: impl Into<String>, actions: Vec<Action>) {
        self.states.push(State {
            name: name.into(),
            actions,
        });
    }

    pub fn define_int(&mut self, name: impl Into<String>, value: i64) {
        self.variables.define_int(name, value);
    }

    pub fn define_bool(&mut self, name: impl Into<String>, value: bool) {
        self.variables.define_bool(name, value);
    }

    pub fn state(&self, name: &str) -> Result<&State, FsmError> {
        self.states
            .iter()
            .find(|state| state.name == name)
            .ok_or_else(|| FsmError::MissingState {
                machine: self.fsm_name.clone(),
                state: name.to_string(),
            })
    }

    pub fn state_mut(&mut self, name: &str) -> Result<&mut State, FsmError> {
        let machine = self.fsm_name.clone();
        self.states
            .iter_mut()
            .find(|state| state.name == name)
            .ok_or(FsmError::MissingState {
                machine,
                state: name.to_string(),
            })
    }

    pub fn action(&self, state: &str, index: usize) -> Result<&Action, FsmError> {
        let machine = self.fsm_name.clone();
        self.state(state)?
            .actions
            .get(index)
            .ok_or(FsmError::MissingAction {
                machine,
                state: state.to_string(),
                index,
            })
    }

    pub fn action_mut(&mut self, state: &str, index: usize) -> Result<&mut Action, FsmError> {
        let machine = self.fsm_name.clone();
        self.state_mut(state)?
            .actions
            .get_mut(index)
            .ok_or(FsmError::MissingAction {
                machine,
                state: state.to_string(),
                index,
            })
    }

    pub fn action_count(&self, state: &str) -> Result<usize, FsmError> {
        Ok(self.state(state)?.actions.len())
    }

    /// Inserts an action at `index`, shifting later actions down the list.
    pub fn insert_action(&mut self, state: &str, index: usize, action: Action) -> Result<(), FsmError> {
        let machine = self.fsm_name.clone();
        let actions = &mut self.state_mut(state)?.actions;
        if index > actions.len() {
            return Err(FsmError::MissingAction {
                machine,
                state: state.to_string(),
                index,
            });
        }
        actions.insert(index, action);
        Ok(())
    }

    pub fn remove_action(&mut self, state: &str, index: usize) -> Result<Action, FsmError> {
        let machine = self.fsm_name.clone();
        let actions = &mut self.state_mut(state)?.actions;
        if index >= actions.len() {
            return Err(FsmError::MissingAction {
                machine,
                state: state.to_string(),
                index,
            });
        }
        Ok(actions.remove(index))
    }

    pub fn read_int(&self, name: &str) -> Result<i64, FsmError> {
        self.variables.int(name).ok_or_else(|| FsmError::MissingVariable {
            machine: self.fsm_name.clone(),
            kind: "int",
            name: name.to_string(),
        })
    }

    pub fn write_int(&mut self, name: &str, value: i64) -> Result<(), FsmError> {
        if self.variables.set_int(name, value) {
            Ok(())
        } else {
            Err(FsmError::MissingVariable {
                machine: self.fsm_name.clone(),
                kind: "int",
                name: name.to_string(),
            })
        }
    }

    pub fn read_bool(&self, name: &str) -> Result<bool, FsmError> {
        self.variables
            .bool_value(name)
            .ok_or_else(|| FsmError::MissingVariable {
                machine: self.fsm_name.clone(),
                kind: "bool",
                name: name.to_string(),
            })
    }

    pub fn write_bool(&mut self, name: &str, value: bool) -> Result<(), FsmError> {
        if self.variables.set_bool(name, value) {
            Ok(())
        } else {
            Err(FsmError::MissingVariable {
                machine: self.fsm_name.clone(),
                kind: "bool",
                name: name.to_string(),
            })
        }
    }
}
