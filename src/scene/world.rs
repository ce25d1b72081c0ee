use crate::config::options::RecordingConfig;
use crate::encode::sink::FrameEncoder;
use crate::foundation::core::{EntityId, RecorderId, Transform3D};
use crate::foundation::error::{RecorderError, RecorderResult};
use crate::recorder::controller::{FinishReport, RecordingController, StartOutcome, TickOutcome};
use crate::render::backend::{FrameRGBA, Marker, RenderBackend, RenderInput};
use crate::scene::controls::{ButtonAction, ButtonId, ControlPanel};
use crate::scene::entity::{Camera, Entity};
use crate::scene::events::{EventBus, TriggerEvent};

/// Scene-wide switches recorders may flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneFlags {
    /// Whether the "enter VR" UI is offered.
    pub vr_mode_ui: bool,
}

impl Default for SceneFlags {
    fn default() -> Self {
        Self { vr_mode_ui: true }
    }
}

/// Per-recorder results of one [`Scene::tick`].
#[derive(Debug)]
pub struct TickReport {
    /// Scene time after the tick.
    pub time_ms: f64,
    /// Outcome of every attached recorder, in attach order.
    pub outcomes: Vec<(RecorderId, RecorderResult<TickOutcome>)>,
}

impl TickReport {
    /// Recorders that finalized on this tick.
    pub fn finished(&self) -> impl Iterator<Item = (RecorderId, &FinishReport)> {
        self.outcomes.iter().filter_map(|(id, out)| match out {
            Ok(TickOutcome::Finished(report)) => Some((*id, report)),
            _ => None,
        })
    }

    /// Recorders whose session failed on this tick.
    pub fn errors(&self) -> impl Iterator<Item = (RecorderId, &RecorderError)> {
        self.outcomes
            .iter()
            .filter_map(|(id, out)| out.as_ref().err().map(|e| (*id, e)))
    }

    /// Outcome for one recorder.
    pub fn outcome(&self, id: RecorderId) -> Option<&RecorderResult<TickOutcome>> {
        self.outcomes
            .iter()
            .find(|(rid, _)| *rid == id)
            .map(|(_, out)| out)
    }
}

/// Headless real-time scene: entities, attached recorders, trigger routing and a renderer.
///
/// Each [`Scene::tick`] runs, in order: pending one-shot play setups, tweens, look-at
/// constraints, rendering, then every recorder's capture/finish decision.
pub struct Scene {
    entities: Vec<Entity>,
    recorders: Vec<RecordingController>,
    events: EventBus,
    panel: ControlPanel,
    flags: SceneFlags,
    markers: Vec<Marker>,
    renderer: Box<dyn RenderBackend>,
    active_camera: Option<EntityId>,
    frame: Option<FrameRGBA>,
    time_ms: f64,
    next_entity: u32,
    next_recorder: u32,
}

impl Scene {
    /// Empty scene rendered by `renderer`.
    pub fn new(renderer: Box<dyn RenderBackend>) -> Self {
        Self {
            entities: Vec::new(),
            recorders: Vec::new(),
            events: EventBus::default(),
            panel: ControlPanel::default(),
            flags: SceneFlags::default(),
            markers: Vec::new(),
            renderer,
            active_camera: None,
            frame: None,
            time_ms: 0.0,
            next_entity: 0,
            next_recorder: 0,
        }
    }

    /// Add a plain entity.
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform3D) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.entities.push(Entity::new(id, name, transform));
        id
    }

    /// Add an entity with a camera. The first camera spawned becomes the active one.
    pub fn spawn_camera(
        &mut self,
        name: impl Into<String>,
        transform: Transform3D,
        camera: Camera,
    ) -> EntityId {
        let id = self.spawn(name, transform);
        if let Some(e) = self.entities.last_mut() {
            e.camera = Some(camera);
        }
        self.active_camera.get_or_insert(id);
        id
    }

    /// Render through `id`'s camera.
    pub fn set_active_camera(&mut self, id: EntityId) -> RecorderResult<()> {
        let entity = self.entity(id).ok_or_else(|| unknown_entity(id))?;
        if entity.camera.is_none() {
            return Err(RecorderError::scene(format!("{id} has no camera")));
        }
        self.active_camera = Some(id);
        Ok(())
    }

    /// Look an entity up.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Mutable access to an entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Add a marker to draw.
    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// Markers drawn each frame.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Create a recorder on `entity` and run its init-time setup.
    pub fn attach_recorder(
        &mut self,
        entity: EntityId,
        config: RecordingConfig,
        encoder: Box<dyn FrameEncoder>,
    ) -> RecorderResult<RecorderId> {
        let id = RecorderId(self.next_recorder);
        let mut rec = RecordingController::new(id, entity, config, encoder)?;

        let target = self
            .entities
            .iter_mut()
            .find(|e| e.id() == entity)
            .ok_or_else(|| unknown_entity(entity))?;
        rec.attach(target, &mut self.events, &mut self.panel)?;

        self.next_recorder += 1;
        self.recorders.push(rec);
        tracing::info!(recorder = %id, entity = %entity, "recorder attached");
        Ok(id)
    }

    /// Tear a recorder down and drop it.
    pub fn detach_recorder(&mut self, id: RecorderId) -> RecorderResult<()> {
        let idx = self
            .recorders
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| unknown_recorder(id))?;
        let mut rec = self.recorders.remove(idx);
        let entity = self.entities.iter_mut().find(|e| e.id() == rec.entity());
        rec.detach(entity, &mut self.events, &mut self.panel);
        Ok(())
    }

    /// Look a recorder up.
    pub fn recorder(&self, id: RecorderId) -> Option<&RecordingController> {
        self.recorders.iter().find(|r| r.id() == id)
    }

    /// Attached recorders in attach order.
    pub fn recorders(&self) -> impl Iterator<Item = &RecordingController> {
        self.recorders.iter()
    }

    /// Call `start(dry_run)` on a recorder directly.
    pub fn start(&mut self, id: RecorderId, dry_run: bool) -> RecorderResult<StartOutcome> {
        let rec = self
            .recorders
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| unknown_recorder(id))?;
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.id() == rec.entity())
            .ok_or_else(|| unknown_entity(rec.entity()))?;
        rec.start(dry_run, entity)
    }

    /// Stop a recording before its window elapses, without output.
    pub fn cancel(&mut self, id: RecorderId) -> RecorderResult<bool> {
        let rec = self
            .recorders
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| unknown_recorder(id))?;
        Ok(rec.cancel())
    }

    /// Dispatch a trigger event on `entity` to every subscribed recorder.
    pub fn emit(
        &mut self,
        entity: EntityId,
        event: TriggerEvent,
    ) -> Vec<(RecorderId, RecorderResult<StartOutcome>)> {
        let listeners = self.events.listeners(entity, event);
        tracing::debug!(entity = %entity, event = event.name(), listeners = listeners.len(), "emit");
        listeners
            .into_iter()
            .map(|id| (id, self.start(id, event.is_dry_run())))
            .collect()
    }

    /// Dispatch a trigger event given by wire name.
    pub fn emit_named(
        &mut self,
        entity: EntityId,
        name: &str,
    ) -> RecorderResult<Vec<(RecorderId, RecorderResult<StartOutcome>)>> {
        let event = TriggerEvent::from_name(name)
            .ok_or_else(|| RecorderError::scene(format!("unknown trigger event '{name}'")))?;
        Ok(self.emit(entity, event))
    }

    /// Click a control-panel button.
    pub fn click(&mut self, button: ButtonId) -> RecorderResult<StartOutcome> {
        let b = self
            .panel
            .button(button)
            .ok_or_else(|| RecorderError::scene("unknown button"))?;
        if !b.enabled {
            return Err(RecorderError::scene(format!(
                "button '{}' is disabled",
                b.label
            )));
        }
        match b.action {
            ButtonAction::Start { recorder, dry_run } => self.start(recorder, dry_run),
        }
    }

    /// Advance the scene by `delta_ms`.
    pub fn tick(&mut self, delta_ms: f64) -> TickReport {
        let delta_ms = if delta_ms.is_finite() && delta_ms >= 0.0 {
            delta_ms
        } else {
            tracing::warn!(delta_ms, "ignoring invalid scene delta");
            0.0
        };
        self.time_ms += delta_ms;

        for rec in self.recorders.iter_mut().filter(|r| r.needs_play_setup()) {
            if let Some(entity) = self.entities.iter_mut().find(|e| e.id() == rec.entity()) {
                rec.play(entity, &mut self.flags);
            }
        }

        for entity in &mut self.entities {
            entity.advance_tweens(delta_ms);
        }

        for rec in &self.recorders {
            if let Some(entity) = self.entities.iter_mut().find(|e| e.id() == rec.entity()) {
                rec.constraint().on_tick(entity);
            }
        }

        self.frame = self.render_frame();

        let outcomes = self
            .recorders
            .iter_mut()
            .map(|rec| {
                let out = rec.on_tick(delta_ms, self.frame.as_ref(), &mut self.panel);
                (rec.id(), out)
            })
            .collect();

        TickReport {
            time_ms: self.time_ms,
            outcomes,
        }
    }

    fn render_frame(&mut self) -> Option<FrameRGBA> {
        let camera = self
            .active_camera
            .and_then(|id| self.entities.iter().find(|e| e.id() == id))
            .and_then(Entity::camera_view)?;
        match self.renderer.render(RenderInput {
            camera,
            markers: &self.markers,
        }) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!(error = %err, "render failed");
                None
            }
        }
    }

    /// `true` while any recorder is capturing.
    pub fn is_recording(&self) -> bool {
        self.recorders.iter().any(|r| r.session().is_recording())
    }

    /// Control panel with injected buttons.
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    /// Scene-wide switches.
    pub fn flags(&self) -> SceneFlags {
        self.flags
    }

    /// Most recently rendered frame.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    /// Accumulated scene time.
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Live trigger subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.events.len()
    }
}

fn unknown_entity(id: EntityId) -> RecorderError {
    RecorderError::scene(format!("unknown {id}"))
}

fn unknown_recorder(id: RecorderId) -> RecorderError {
    RecorderError::scene(format!("unknown {id}"))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/world.rs"]
mod tests;
