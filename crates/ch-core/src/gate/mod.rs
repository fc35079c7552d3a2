//! Navigation gate decision table.
//!
//! The gate picks one of two mutually exclusive screen subtrees from three
//! level-triggered inputs. It keeps no memory of previous decisions.

use serde::Serialize;

use crate::profile::Completion;

/// Inputs the gate is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInputs {
    pub hydrated: bool,
    pub bootstrap_loading: bool,
    pub completion: Completion,
}

/// What the routing layer should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateView {
    Loading,
    Onboarding,
    Main,
}

/// Named mount points exposed to the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MountPoint {
    Onboarding,
    Main,
}

impl MountPoint {
    pub fn name(self) -> &'static str {
        match self {
            MountPoint::Onboarding => "onboarding",
            MountPoint::Main => "main",
        }
    }
}

impl std::fmt::Display for MountPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl GateView {
    pub fn evaluate(inputs: GateInputs) -> Self {
        if !inputs.hydrated || inputs.bootstrap_loading {
            return GateView::Loading;
        }
        match inputs.completion {
            Completion::Unknown => GateView::Loading,
            Completion::Incomplete => GateView::Onboarding,
            Completion::Complete => GateView::Main,
        }
    }

    /// The subtree to mount, `None` while loading.
    pub fn mount_point(self) -> Option<MountPoint> {
        match self {
            GateView::Loading => None,
            GateView::Onboarding => Some(MountPoint::Onboarding),
            GateView::Main => Some(MountPoint::Main),
        }
    }

    pub fn is_settled(self) -> bool {
        self != GateView::Loading
    }
}
