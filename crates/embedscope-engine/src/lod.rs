//! Level of detail: plain points when many are visible, labels when few are.

use serde::{Deserialize, Serialize};

use embedscope_core::CameraState;
use embedscope_io::LodRule;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LodMode {
    #[default]
    Overview,
    Detail,
}

/// What a mode update means for the layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodTransition {
    EnterDetail,
    StayDetail,
    EnterOverview,
    StayOverview,
}

impl LodTransition {
    pub fn mode(&self) -> LodMode {
        match self {
            LodTransition::EnterDetail | LodTransition::StayDetail => LodMode::Detail,
            LodTransition::EnterOverview | LodTransition::StayOverview => LodMode::Overview,
        }
    }
}

/// Mode for `visible` points seen through `camera`.
pub fn decide(rule: &LodRule, visible: usize, camera: &CameraState) -> LodMode {
    let detail = match *rule {
        LodRule::PointCount { label_threshold } => visible <= label_threshold,
        // Any count qualifies; the engine caps how many get labels.
        LodRule::ZoomFactor {
            zoom_start_threshold,
        } => camera.zoom_factor() > zoom_start_threshold,
    };
    if detail {
        LodMode::Detail
    } else {
        LodMode::Overview
    }
}

pub struct LodController {
    rule: LodRule,
    mode: LodMode,
}

impl LodController {
    pub fn new(rule: LodRule) -> Self {
        Self {
            rule,
            mode: LodMode::Overview,
        }
    }

    pub fn mode(&self) -> LodMode {
        self.mode
    }

    pub fn rule(&self) -> &LodRule {
        &self.rule
    }

    pub fn update(&mut self, visible: usize, camera: &CameraState) -> LodTransition {
        let next = decide(&self.rule, visible, camera);
        let transition = match (self.mode, next) {
            (LodMode::Overview, LodMode::Detail) => LodTransition::EnterDetail,
            (LodMode::Detail, LodMode::Detail) => LodTransition::StayDetail,
            (LodMode::Detail, LodMode::Overview) => LodTransition::EnterOverview,
            (LodMode::Overview, LodMode::Overview) => LodTransition::StayOverview,
        };
        if self.mode != next {
            log::info!("LOD {:?} -> {:?} ({visible} points in view)", self.mode, next);
        }
        self.mode = next;
        transition
    }

    /// Back to overview without a transition, e.g. after teardown.
    pub fn reset(&mut self) {
        self.mode = LodMode::Overview;
    }
}
