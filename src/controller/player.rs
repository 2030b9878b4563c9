use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use tracing::{debug, trace};

use crate::config::player::{
    CAMERA_OFFSET, DRAG_SENSITIVITY, GROUND_DISTANCE, GROUND_RAY_LENGTH, JUMP_IMPULSE,
};
use crate::controller::input::{Actions, PointerDrag, PointerHub, PointerListenerGuard};
use crate::controller::physics::RigidBodyWorld;
use crate::model::{Camera, HandRig};

/// Drives the avatar from input and physics feedback once per tick, then
/// pins the follow camera and the hand prop to it.
pub struct PlayerController<H> {
    body: Option<H>,
    drag: Rc<RefCell<PointerDrag>>,
    pointer_guard: Option<PointerListenerGuard>,
    pub hand: HandRig,
    grounded: bool,
    direction: Vec3,
    key_intent: Vec3,
}

impl<H: Copy> Default for PlayerController<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy> PlayerController<H> {
    pub fn new() -> Self {
        Self {
            body: None,
            drag: Rc::new(RefCell::new(PointerDrag::default())),
            pointer_guard: None,
            hand: HandRig::default(),
            grounded: false,
            direction: Vec3::ZERO,
            key_intent: Vec3::ZERO,
        }
    }

    /// Bind the avatar rigid body. Until then every tick is a no-op.
    pub fn attach(&mut self, body: H) {
        self.body = Some(body);
    }

    pub fn body(&self) -> Option<H> {
        self.body
    }

    /// Start tracking drags from the document-level pointer source
    pub fn mount(&mut self, hub: &PointerHub) {
        let drag = self.drag.clone();
        self.pointer_guard = Some(hub.listen(move |event| drag.borrow_mut().handle(event)));
        debug!("player pointer listeners attached");
    }

    /// Stop tracking drags; also happens when the controller is dropped
    pub fn unmount(&mut self) {
        if self.pointer_guard.take().is_some() {
            *self.drag.borrow_mut() = PointerDrag::default();
            debug!("player pointer listeners detached");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.pointer_guard.is_some()
    }

    pub fn drag(&self) -> PointerDrag {
        *self.drag.borrow()
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Planar velocity requested by the last tick
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Direction the movement keys point at. Polled every tick but not fed
    /// into the velocity: only drags move the avatar.
    pub fn key_intent(&self) -> Vec3 {
        self.key_intent
    }

    /// Velocity requested by a drag that started at `drag.start`: the offset
    /// from the viewport centre, x to x and y to z
    pub fn drag_direction(drag: &PointerDrag, viewport: Vec2) -> Vec3 {
        if !drag.active {
            return Vec3::ZERO;
        }
        let offset = drag.start - viewport / 2.0;
        Vec3::new(offset.x, 0.0, offset.y) * DRAG_SENSITIVITY
    }

    pub fn tick<W>(
        &mut self,
        world: &mut W,
        camera: &mut Camera,
        actions: Actions,
        elapsed: f32,
        viewport: Vec2,
    ) where
        W: RigidBodyWorld<Handle = H>,
    {
        let Some(body) = self.body else { return };
        let (Some(velocity), Some(position)) = (world.linvel(body), world.translation(body)) else {
            return;
        };

        // Follow camera and hand
        camera.eye = position + CAMERA_OFFSET;
        self.hand.follow(camera.eye, camera.forward(), camera.rotation(), velocity.length(), elapsed);

        // Movement
        let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
        self.key_intent = Vec3::new(
            axis(actions.left, actions.right),
            0.0,
            axis(actions.backward, actions.forward),
        );
        self.direction = Self::drag_direction(&self.drag.borrow(), viewport);
        world.set_linvel(body, Vec3::new(self.direction.x, velocity.y, self.direction.z));

        // Jumping
        let grounded = world
            .cast_ray(position, Vec3::NEG_Y, GROUND_RAY_LENGTH, Some(body))
            .is_some_and(|hit| hit.toi.abs() <= GROUND_DISTANCE);
        if grounded != self.grounded {
            trace!(grounded, y = position.y, "ground contact changed");
        }
        self.grounded = grounded;

        if actions.jump && grounded {
            world.set_linvel(body, Vec3::new(0.0, JUMP_IMPULSE, 0.0));
        }
    }
}
