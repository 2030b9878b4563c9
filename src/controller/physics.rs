use glam::Vec3;
use rapier3d::prelude::*;

use crate::config;

/// Nearest intersection reported by a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the (unit) ray direction
    pub toi: f32,
}

/// What the controllers need from a rigid-body simulation.
///
/// Implemented by [`PhysicsWorld`] on top of rapier; tests substitute a
/// scripted world.
pub trait RigidBodyWorld {
    type Handle: Copy;

    fn linvel(&self, body: Self::Handle) -> Option<Vec3>;
    fn set_linvel(&mut self, body: Self::Handle, linvel: Vec3);
    fn translation(&self, body: Self::Handle) -> Option<Vec3>;

    /// Nearest collider hit along `dir` within `max_toi`, ignoring `exclude`
    fn cast_ray(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_toi: f32,
        exclude: Option<Self::Handle>,
    ) -> Option<RayHit>;
}

/// Physics simulation world
///
/// Owns every rigid body and collider of the scene and advances them once
/// per frame. Thin wrapper around rapier's pipeline.
pub struct PhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    gravity: Vector<Real>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            gravity: vector![gravity.x, gravity.y, gravity.z],
        }
    }

    /// Step the simulation by `dt` seconds. Ray queries see the result of
    /// the most recent step.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    pub fn add_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(body)
    }

    pub fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.collider_set.insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    /// Fixed floor whose top face is the y = 0 plane
    pub fn spawn_ground(&mut self) -> RigidBodyHandle {
        let center = config::physics::GROUND_CENTER;
        let half = config::physics::GROUND_HALF_EXTENTS;
        let body = self.add_rigid_body(RigidBodyBuilder::fixed().build());
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .translation(vector![center.x, center.y, center.z])
            .build();
        self.add_collider(collider, body);
        body
    }

    /// Upright dynamic capsule with rotations locked
    pub fn spawn_avatar(&mut self, position: Vec3) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .lock_rotations()
            .build();
        let handle = self.add_rigid_body(body);
        let collider = ColliderBuilder::capsule_y(
            config::player::CAPSULE_HALF_HEIGHT,
            config::player::CAPSULE_RADIUS,
        )
        .mass(config::player::MASS)
        .build();
        self.add_collider(collider, handle);
        handle
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(config::physics::GRAVITY)
    }
}

impl RigidBodyWorld for PhysicsWorld {
    type Handle = RigidBodyHandle;

    fn linvel(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body).map(|b| {
            let v = b.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    fn set_linvel(&mut self, body: RigidBodyHandle, linvel: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_linvel(vector![linvel.x, linvel.y, linvel.z], true);
        }
    }

    fn translation(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body).map(|b| {
            let t = b.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_toi: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RayHit> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], vector![dir.x, dir.y, dir.z]);
        let mut filter = QueryFilter::default();
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }
        self.query_pipeline
            .cast_ray(&self.rigid_body_set, &self.collider_set, &ray, max_toi, true, filter)
            .map(|(_, toi)| RayHit { toi })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = PhysicsWorld::default();
        assert_eq!(world.gravity(), Vec3::new(0.0, -30.0, 0.0));
    }

    #[test]
    fn test_avatar_falls_and_lands_on_ground() {
        let mut world = PhysicsWorld::default();
        world.spawn_ground();
        let avatar = world.spawn_avatar(Vec3::new(0.0, 10.0, 0.0));

        for _ in 0..180 {
            world.step(1.0 / 60.0);
        }

        let pos = world.translation(avatar).unwrap();
        // Capsule bottom rests on y = 0: centre at half-height + radius
        assert!((pos.y - 1.25).abs() < 0.1, "avatar rests at {pos:?}");

        let hit = world.cast_ray(pos, Vec3::NEG_Y, 100.0, Some(avatar)).unwrap();
        assert!(hit.toi <= config::player::GROUND_DISTANCE);
    }

    #[test]
    fn test_ray_from_inside_hits_own_capsule_unless_excluded() {
        let mut world = PhysicsWorld::default();
        world.spawn_ground();
        let avatar = world.spawn_avatar(Vec3::new(0.0, 10.0, 0.0));
        world.step(1.0 / 60.0);

        let pos = world.translation(avatar).unwrap();
        let own = world.cast_ray(pos, Vec3::NEG_Y, 100.0, None).unwrap();
        assert_eq!(own.toi, 0.0);

        let ground = world.cast_ray(pos, Vec3::NEG_Y, 100.0, Some(avatar)).unwrap();
        assert!((ground.toi - pos.y).abs() < 1e-3);
    }

    #[test]
    fn test_set_linvel_round_trips() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let avatar = world.spawn_avatar(Vec3::ZERO);
        world.set_linvel(avatar, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(world.linvel(avatar), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_rotations_stay_locked() {
        let mut world = PhysicsWorld::default();
        world.spawn_ground();
        let avatar = world.spawn_avatar(Vec3::new(0.3, 3.0, 0.0));
        world.set_linvel(avatar, Vec3::new(4.0, 0.0, -2.0));
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let body = world.get_rigid_body(avatar).unwrap();
        assert!(body.rotation().angle() < 1e-4);
    }
}
