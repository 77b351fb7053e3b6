//! Per-agent kinematic state and parameters.

use std::f32::consts::TAU;

use nav_core::{AgentId, PrefVelocity, Vector2, det};

// ── AgentParams ───────────────────────────────────────────────────────────────

/// Per-agent tunables.  The defaults describe an average adult pedestrian.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentParams {
    /// m/s
    pub max_speed:         f32,
    /// m/s²
    pub max_accel:         f32,
    /// m/s
    pub pref_speed:        f32,
    /// m
    pub radius:            f32,
    /// Neighbor search radius in metres.
    pub neighbor_dist:     f32,
    pub max_neighbors:     usize,
    /// Bitmask matched against obstacle classes.
    pub obstacle_set:      u32,
    /// Seconds of lookahead against other agents.
    pub time_horizon:      f32,
    /// Seconds of lookahead against obstacles.
    pub time_horizon_obst: f32,
    /// rad/s
    pub max_ang_vel:       f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            max_speed:         2.5,
            max_accel:         2.0,
            pref_speed:        1.34,
            radius:            0.19,
            neighbor_dist:     5.0,
            max_neighbors:     10,
            obstacle_set:      0xFFFF_FFFF,
            time_horizon:      2.5,
            time_horizon_obst: 0.15,
            max_ang_vel:       TAU,
        }
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One simulated pedestrian.
///
/// `vel_new` is scratch written by the avoidance phase and consumed by
/// [`integrate`](Self::integrate); every other field is read-only while
/// per-agent phases run in parallel.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id:      AgentId,
    pub pos:     Vector2,
    pub vel:     Vector2,
    pub vel_new: Vector2,
    /// Unit facing direction.
    pub orient:  Vector2,
    pub pref:    PrefVelocity,
    pub params:  AgentParams,
}

impl Agent {
    pub fn new(id: AgentId, pos: Vector2, params: AgentParams) -> Self {
        let pref = PrefVelocity::new(Vector2::new(1.0, 0.0), params.pref_speed, Vector2::ZERO);
        Self {
            id,
            pos,
            vel: Vector2::ZERO,
            vel_new: Vector2::ZERO,
            orient: pref.preferred(),
            pref,
            params,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.params.radius
    }

    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.params.max_speed
    }

    /// Apply `vel_new` subject to the acceleration limit, advance the
    /// position, then turn toward the direction of motion no faster than
    /// `max_ang_vel`.
    pub fn integrate(&mut self, time_step: f32) {
        let max_dv = self.params.max_accel * time_step;
        let del_v = (self.vel - self.vel_new).length();
        if del_v > max_dv {
            let w = max_dv / del_v;
            self.vel = self.vel * (1.0 - w) + self.vel_new * w;
        } else {
            self.vel = self.vel_new;
        }
        self.pos += self.vel * time_step;
        self.update_orient(time_step);
    }

    fn update_orient(&mut self, time_step: f32) {
        let speed = self.vel.length();
        let speed_thresh = self.params.pref_speed / 3.0;
        let mut new_orient = self.orient;
        if speed >= speed_thresh && speed > 0.0 {
            new_orient = self.vel / speed;
        } else {
            // Slow agents blend toward where they want to go.
            let frac = if speed_thresh > 0.0 { (speed / speed_thresh).sqrt() } else { 0.0 };
            let pref_dir = self.pref.preferred();
            if pref_dir.length_sq() > 1e-6 {
                let move_dir = if speed > 0.0 { self.vel / speed } else { Vector2::ZERO };
                let blended = move_dir * frac + pref_dir * (1.0 - frac);
                if blended.length_sq() > 0.0 {
                    new_orient = blended.normalized();
                }
            }
        }

        let max_angle = time_step * self.params.max_ang_vel;
        let (max_st, max_ct) = max_angle.sin_cos();
        if new_orient.dot(self.orient) < max_ct {
            let o = self.orient;
            self.orient = if det(o, new_orient) > 0.0 {
                Vector2::new(max_ct * o.x - max_st * o.y, max_st * o.x + max_ct * o.y)
            } else {
                Vector2::new(max_ct * o.x + max_st * o.y, -max_st * o.x + max_ct * o.y)
            };
        } else {
            self.orient = new_orient;
        }
    }
}
