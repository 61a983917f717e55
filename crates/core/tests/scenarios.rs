use shader_timeline_core::{
    AssetDescriptor, EditCommand, EditorConfig, EditorSession, ElementKind, GestureInput,
    HitTarget, ResizeEdge, TickTier, TimelineElement, TimelineError,
};

fn session(duration: f64) -> EditorSession {
    let mut session = EditorSession::new(EditorConfig::default()).unwrap();
    session
        .select_audio(&AssetDescriptor::named("track.mp3").with_duration(duration))
        .unwrap();
    session
}

fn video(name: &str, seconds: f64) -> AssetDescriptor {
    AssetDescriptor::named(name).with_duration(seconds)
}

fn span(element: &TimelineElement) -> (u32, f64, f64) {
    (element.layer, element.start_time, element.duration)
}

#[test]
fn first_video_is_capped_at_ten_seconds() {
    let mut session = session(120.0);
    let id = session
        .add_element(ElementKind::Video, video("a.mp4", 15.0), None)
        .unwrap()
        .unwrap();

    assert_eq!(span(session.timeline().element(id).unwrap()), (0, 0.0, 10.0));
}

#[test]
fn second_video_concatenates_on_layer_zero() {
    let mut session = session(120.0);
    session
        .add_element(ElementKind::Video, video("a.mp4", 15.0), None)
        .unwrap();
    let id = session
        .add_element(ElementKind::Video, video("b.mp4", 5.0), None)
        .unwrap()
        .unwrap();

    assert_eq!(span(session.timeline().element(id).unwrap()), (0, 10.0, 5.0));
}

#[test]
fn shader_on_fresh_timeline_goes_to_layer_one() {
    let mut session = session(120.0);
    let id = session
        .add_element(ElementKind::Shader, AssetDescriptor::named("plasma.glsl"), None)
        .unwrap()
        .unwrap();

    assert_eq!(span(session.timeline().element(id).unwrap()), (1, 0.0, 10.0));
}

#[test]
fn dragging_into_a_neighbour_snaps_to_its_end() {
    let mut session = session(120.0);
    session
        .add_element(ElementKind::Video, video("a.mp4", 15.0), None)
        .unwrap();
    let b = session
        .add_element(ElementKind::Video, video("b.mp4", 5.0), None)
        .unwrap()
        .unwrap();

    session
        .pointer(GestureInput::PointerDown {
            element: b,
            target: HitTarget::Body,
            x: 1_000.0,
        })
        .unwrap();
    session.pointer(GestureInput::PointerMove { x: 700.0 }).unwrap();
    session.pointer(GestureInput::PointerUp).unwrap();

    assert_eq!(session.timeline().element(b).unwrap().start_time, 10.0);
    session.timeline().check_invariants().unwrap();
}

#[test]
fn ruler_tiers_follow_zoom() {
    let mut session = session(120.0);

    session.set_zoom(0.5);
    let ruler = session.ruler(None);
    assert_eq!(ruler.tiers.len(), 1);
    assert!(ruler.shows(TickTier::ThirtySeconds));

    session.set_zoom(6.0);
    let ruler = session.ruler(None);
    for tier in [
        TickTier::ThirtySeconds,
        TickTier::TenSeconds,
        TickTier::FiveSeconds,
        TickTier::OneSecond,
    ] {
        assert!(ruler.shows(tier), "{tier:?} should be visible");
    }
    assert!(!ruler.shows(TickTier::Frame));
}

#[test]
fn wrong_kind_drops_are_rejected_with_reason() {
    let mut session = session(60.0);

    let shader = session
        .drop_element(ElementKind::Shader, AssetDescriptor::named("s.glsl"), 0)
        .unwrap_err();
    assert_eq!(shader.to_string(), "layer-reserved-for-video");

    let clip = session
        .drop_element(ElementKind::Video, video("v.mp4", 4.0), 1)
        .unwrap_err();
    assert_eq!(clip.to_string(), "layer-reserved-for-shader-or-transition");

    assert!(session.timeline().is_empty());
}

#[test]
fn full_video_layer_opens_layer_two() {
    let mut session = session(10.0);
    session
        .add_element(ElementKind::Video, video("a.mp4", 10.0), None)
        .unwrap();

    // layer 0 is full, so the next video opens layer 2
    let id = session
        .add_element(ElementKind::Video, video("b.mp4", 3.0), None)
        .unwrap()
        .unwrap();
    assert_eq!(span(session.timeline().element(id).unwrap()), (2, 0.0, 3.0));
}

#[test]
fn undo_round_trip_restores_every_state() {
    let mut session = session(60.0);
    let mut states = vec![session.timeline().elements().to_vec()];

    let a = session
        .add_element(ElementKind::Video, video("a.mp4", 8.0), None)
        .unwrap()
        .unwrap();
    states.push(session.timeline().elements().to_vec());
    session
        .add_element(ElementKind::Shader, AssetDescriptor::named("s.glsl"), None)
        .unwrap();
    states.push(session.timeline().elements().to_vec());
    session.set_element_start(a, 20.0).unwrap();
    states.push(session.timeline().elements().to_vec());
    session.remove_element(a).unwrap();
    states.push(session.timeline().elements().to_vec());

    for expected in states.iter().rev().skip(1) {
        assert!(session.undo().unwrap());
        assert_eq!(session.timeline().elements(), expected.as_slice());
    }
    assert!(!session.undo().unwrap());

    for expected in states.iter().skip(1) {
        assert!(session.redo().unwrap());
        assert_eq!(session.timeline().elements(), expected.as_slice());
    }
    assert!(!session.redo().unwrap());
}

#[test]
fn new_commit_after_undo_discards_redo() {
    let mut session = session(60.0);
    session
        .add_element(ElementKind::Video, video("a.mp4", 5.0), None)
        .unwrap();
    session.undo().unwrap();
    session
        .add_element(ElementKind::Shader, AssetDescriptor::named("s.glsl"), None)
        .unwrap();

    assert!(!session.redo().unwrap());
    assert_eq!(session.timeline().elements().len(), 1);
    assert_eq!(session.timeline().elements()[0].kind, ElementKind::Shader);
}

#[test]
fn removing_selected_element_clears_selection() {
    let mut session = session(60.0);
    let id = session
        .add_element(ElementKind::Video, video("a.mp4", 5.0), None)
        .unwrap()
        .unwrap();
    session.select(id);

    session.remove_element(id).unwrap();
    assert_eq!(session.timeline().selected(), None);
    assert!(matches!(
        session.remove_element(id),
        Err(TimelineError::ElementNotFound(_))
    ));
}

#[test]
fn long_drag_keeps_event_queue_small() {
    let mut session = session(120.0);
    let id = session
        .add_element(ElementKind::Shader, AssetDescriptor::named("s.glsl"), None)
        .unwrap()
        .unwrap();

    session
        .pointer(GestureInput::PointerDown {
            element: id,
            target: HitTarget::Body,
            x: 0.0,
        })
        .unwrap();
    for step in 0..100_000u32 {
        let x = f64::from(step % 5_000);
        session.pointer(GestureInput::PointerMove { x }).unwrap();
    }
    session.pointer(GestureInput::PointerUp).unwrap();
    for _ in 0..50_000 {
        session.seek(1.0);
    }

    let events = session.drain_events();
    assert!(events.len() <= 8, "{} pending events", events.len());
}

/// Small deterministic generator so the sweep needs no extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn signed(&mut self, span: f64) -> f64 {
        (self.below(2_001) as f64 / 1_000.0 - 1.0) * span
    }
}

#[test]
fn invariants_hold_across_mixed_edits() {
    for seed in 1..=8u64 {
        let mut rng = Lcg(seed);
        let mut session = session(45.0);
        let kinds = [ElementKind::Video, ElementKind::Shader, ElementKind::Transition];

        for _ in 0..200 {
            let ids: Vec<_> = session.timeline().elements().iter().map(|e| e.id).collect();
            let pick = (!ids.is_empty()).then(|| ids[rng.below(ids.len() as u64) as usize]);

            match rng.below(8) {
                0 | 1 => {
                    let kind = kinds[rng.below(3) as usize];
                    let asset = video("asset", 1.0 + rng.below(20) as f64);
                    let hint = (rng.below(2) == 0).then(|| rng.below(4) as u32);
                    if let Ok(Some(id)) = session.add_element(kind, asset, hint) {
                        let layer = session.timeline().element(id).unwrap().layer;
                        match kind {
                            ElementKind::Video => assert_ne!(layer, 1, "video placed on layer 1"),
                            ElementKind::Shader | ElementKind::Transition => {
                                assert_ne!(layer, 0, "{kind:?} placed on layer 0")
                            }
                        }
                    }
                }
                2 => {
                    if let Some(id) = pick {
                        let _ = session.set_element_start(id, rng.signed(60.0));
                    }
                }
                3 => {
                    if let Some(id) = pick {
                        let _ = session.set_element_duration(id, rng.signed(30.0));
                    }
                }
                4 => {
                    if let Some(id) = pick {
                        let target = if rng.below(2) == 0 {
                            HitTarget::Body
                        } else if rng.below(2) == 0 {
                            HitTarget::Edge(ResizeEdge::Left)
                        } else {
                            HitTarget::Edge(ResizeEdge::Right)
                        };
                        let down = GestureInput::PointerDown {
                            element: id,
                            target,
                            x: 500.0,
                        };
                        if session.pointer(down).is_ok() {
                            for _ in 0..3 {
                                let x = 500.0 + rng.signed(3_000.0);
                                session.pointer(GestureInput::PointerMove { x }).unwrap();
                            }
                            session.pointer(GestureInput::PointerUp).unwrap();
                        }
                    }
                }
                5 => {
                    let _ = session.undo();
                }
                6 => {
                    let _ = session.redo();
                }
                _ => {
                    if let Some(id) = pick {
                        let _ = session.remove_element(id);
                    }
                }
            }

            session.timeline().check_invariants().unwrap();
            assert!(session.gesture().is_idle());
        }
    }
}

#[test]
fn replayed_script_produces_manifest() {
    use shader_timeline_core::{EditScript, ScriptRunner};

    let script = EditScript {
        audio: video("Night Drive.wav", 90.0),
        commands: vec![
            EditCommand::Add {
                kind: ElementKind::Video,
                asset: video("intro.mp4", 6.0),
                layer: None,
            },
            EditCommand::Drop {
                kind: ElementKind::Transition,
                asset: AssetDescriptor::named("crossfade"),
                layer: 1,
            },
            EditCommand::SetStart {
                element: 1,
                start_time: 20.0,
            },
            EditCommand::MoveToLayer {
                element: 0,
                layer: 1,
            },
        ],
    };

    let mut runner = ScriptRunner::new(EditorSession::new(EditorConfig::default()).unwrap());
    runner.run(&script).unwrap();
    let manifest = runner.session_mut().render_manifest().unwrap();

    assert_eq!(manifest.project_name, "Night Drive");
    assert_eq!(manifest.audio.path, "Input_Audio/Night Drive.wav");
    assert_eq!(manifest.timeline.duration, 90.0);

    let elements = &manifest.timeline.elements;
    assert_eq!(elements.len(), 2);
    let intro = elements.iter().find(|e| e.name == "intro.mp4").unwrap();
    assert_eq!(intro.layer, 1);
    assert!(intro.greenscreen.is_some());
    let fade = elements.iter().find(|e| e.name == "crossfade").unwrap();
    assert_eq!(fade.path, "Transitions/crossfade.glsl");
    assert_eq!(fade.start_time, 20.0);
}
