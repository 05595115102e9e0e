//! Tests for the gesture editor state machine.

#[cfg(test)]
mod tests {
    use super::super::editor::*;
    use super::super::grid::GridMetrics;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    fn editor() -> GestureEditor {
        GestureEditor::new(GridMetrics::default())
    }

    fn sample(x: f64, y: f64) -> PointerSample {
        PointerSample { x, y }
    }

    fn event_ref(start: DateTime<Utc>, end: DateTime<Utc>) -> EventRef {
        EventRef {
            event_id: "evt-1".into(),
            start_time: start,
            end_time: end,
            multi_day: start.date_naive() != end.date_naive(),
            day_index: 1,
            day_span: 1,
        }
    }

    fn multi_day_ref() -> EventRef {
        // Mon 09:00 .. Wed 17:00, columns 1..=3.
        EventRef {
            event_id: "evt-md".into(),
            start_time: at(9, 0),
            end_time: Utc.with_ymd_and_hms(2024, 3, 6, 17, 0, 0).unwrap(),
            multi_day: true,
            day_index: 1,
            day_span: 3,
        }
    }

    fn press_empty(editor: &mut GestureEditor, time: DateTime<Utc>) {
        editor.apply(GestureInput::Press {
            target: PressTarget::EmptySlot {
                day_index: 2,
                at_time: time,
            },
            at: sample(0.0, 0.0),
        });
    }

    #[test]
    fn create_drag_opens_placeholder() {
        let mut editor = editor();
        press_empty(&mut editor, at(9, 7));

        // 105px down at 60px/hour = 105min, already on the snap grid.
        let event = editor.apply(GestureInput::Move {
            at: sample(0.0, 105.0),
        });
        match event {
            Some(EditorEvent::ProposalChanged {
                start_time,
                end_time,
                ..
            }) => {
                // Anchor floors 09:07 to 09:00.
                assert_eq!(start_time, at(9, 0));
                assert_eq!(end_time, at(10, 45));
            }
            other => panic!("expected ProposalChanged, got {other:?}"),
        }

        match editor.apply(GestureInput::Release) {
            Some(EditorEvent::PlaceholderOpened { placeholder }) => {
                assert_eq!(placeholder.start_time, at(9, 0));
                assert_eq!(placeholder.end_time, at(10, 45));
                assert_eq!(placeholder.start_day_index, 2);
                assert_eq!(placeholder.day_span, 1);
            }
            other => panic!("expected PlaceholderOpened, got {other:?}"),
        }

        match editor.apply(GestureInput::Confirm) {
            Some(EditorEvent::EditCommitted {
                edit: ProposedEdit::Create { start_time, .. },
            }) => assert_eq!(start_time, at(9, 0)),
            other => panic!("expected Create commit, got {other:?}"),
        }
        assert!(editor.is_idle());
    }

    #[test]
    fn top_handle_resize_snaps_toward_original_boundary() {
        // 60-minute event; drag the top handle up 22px at 60px/hour.
        // Raw delta -22min, expanding, so it snaps to -15min.
        let mut editor = editor();
        editor.apply(GestureInput::Press {
            target: PressTarget::EventHandle {
                event: event_ref(at(9, 0), at(10, 0)),
                handle: ResizeHandle::Top,
            },
            at: sample(0.0, 100.0),
        });
        let event = editor.apply(GestureInput::Move {
            at: sample(0.0, 78.0),
        });
        match event {
            Some(EditorEvent::ProposalChanged {
                start_time,
                end_time,
                ..
            }) => {
                assert_eq!(start_time, at(8, 45));
                assert_eq!(end_time, at(10, 0));
            }
            other => panic!("expected ProposalChanged, got {other:?}"),
        }

        match editor.apply(GestureInput::Release) {
            Some(EditorEvent::EditCommitted {
                edit:
                    ProposedEdit::Resize {
                        event_id,
                        start_time,
                        end_time,
                    },
            }) => {
                assert_eq!(event_id, "evt-1");
                assert_eq!(start_time, at(8, 45));
                assert_eq!(end_time, at(10, 0));
            }
            other => panic!("expected Resize commit, got {other:?}"),
        }
    }

    #[test]
    fn shrink_clamps_against_minimum_duration() {
        let mut editor = editor();
        editor.apply(GestureInput::Press {
            target: PressTarget::EventHandle {
                event: event_ref(at(9, 0), at(10, 0)),
                handle: ResizeHandle::Bottom,
            },
            at: sample(0.0, 0.0),
        });
        // Drag the bottom handle up two hours: far past the start.
        let event = editor.apply(GestureInput::Move {
            at: sample(0.0, -120.0),
        });
        match event {
            Some(EditorEvent::ProposalChanged {
                start_time,
                end_time,
                ..
            }) => {
                assert_eq!(start_time, at(9, 0));
                assert_eq!(end_time, at(9, 15)); // floor, not inverted
            }
            other => panic!("expected ProposalChanged, got {other:?}"),
        }
    }

    #[test]
    fn successive_placeholder_resizes_compose() {
        let mut editor = editor();
        press_empty(&mut editor, at(9, 0));
        editor.apply(GestureInput::Release); // 09:00-09:15 placeholder

        // First: extend the bottom by 105 minutes.
        editor.apply(GestureInput::Press {
            target: PressTarget::PlaceholderHandle {
                handle: ResizeHandle::Bottom,
            },
            at: sample(0.0, 0.0),
        });
        editor.apply(GestureInput::Move {
            at: sample(0.0, 105.0),
        });
        match editor.apply(GestureInput::Release) {
            Some(EditorEvent::PlaceholderChanged { placeholder }) => {
                assert_eq!(placeholder.end_time, at(11, 0));
            }
            other => panic!("expected PlaceholderChanged, got {other:?}"),
        }

        // Second: shrink from the top far past the floor. The clamp works
        // against the *current* end (11:00), not the original 09:15.
        editor.apply(GestureInput::Press {
            target: PressTarget::PlaceholderHandle {
                handle: ResizeHandle::Top,
            },
            at: sample(0.0, 0.0),
        });
        editor.apply(GestureInput::Move {
            at: sample(0.0, 600.0),
        });
        match editor.apply(GestureInput::Release) {
            Some(EditorEvent::PlaceholderChanged { placeholder }) => {
                assert_eq!(placeholder.start_time, at(10, 45));
                assert_eq!(placeholder.end_time, at(11, 0));
            }
            other => panic!("expected PlaceholderChanged, got {other:?}"),
        }
    }

    #[test]
    fn release_jitter_falls_back_to_peak() {
        let mut editor = editor();
        editor.apply(GestureInput::Press {
            target: PressTarget::EventHandle {
                event: event_ref(at(9, 0), at(10, 0)),
                handle: ResizeHandle::Bottom,
            },
            at: sample(0.0, 0.0),
        });
        // Extend by an hour, then drift back to the origin before release.
        editor.apply(GestureInput::Move {
            at: sample(0.0, 60.0),
        });
        editor.apply(GestureInput::Move {
            at: sample(0.0, 2.0),
        });
        match editor.apply(GestureInput::Release) {
            Some(EditorEvent::EditCommitted {
                edit: ProposedEdit::Resize { end_time, .. },
            }) => assert_eq!(end_time, at(11, 0)),
            other => panic!("expected Resize commit, got {other:?}"),
        }
    }

    #[test]
    fn move_preserves_duration_and_translates_days() {
        let mut editor = editor();
        let mut body = event_ref(at(9, 0), at(10, 30));
        body.day_index = 2;
        editor.apply(GestureInput::Press {
            target: PressTarget::EventBody(body),
            at: sample(0.0, 0.0),
        });
        // One column right, 30 minutes down.
        let event = editor.apply(GestureInput::Move {
            at: sample(125.0, 30.0),
        });
        match event {
            Some(EditorEvent::ProposalChanged {
                start_time,
                end_time,
                day_index,
                ..
            }) => {
                assert_eq!(start_time, Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap());
                assert_eq!(end_time - start_time, Duration::minutes(90));
                assert_eq!(day_index, 3);
            }
            other => panic!("expected ProposalChanged, got {other:?}"),
        }
    }

    #[test]
    fn single_day_move_clamps_at_midnight() {
        let mut editor = editor();
        editor.apply(GestureInput::Press {
            target: PressTarget::EventBody(event_ref(at(23, 0), at(23, 45))),
            at: sample(0.0, 0.0),
        });
        let event = editor.apply(GestureInput::Move {
            at: sample(0.0, 60.0),
        });
        match event {
            Some(EditorEvent::ProposalChanged {
                start_time,
                end_time,
                ..
            }) => {
                // Slid back so the range still ends at midnight.
                assert_eq!(end_time, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
                assert_eq!(end_time - start_time, Duration::minutes(45));
                assert_eq!(start_time, at(23, 15));
            }
            other => panic!("expected ProposalChanged, got {other:?}"),
        }
    }

    #[test]
    fn corner_resize_decomposes_day_and_time() {
        let mut editor = editor();
        editor.apply(GestureInput::Press {
            target: PressTarget::EventHandle {
                event: multi_day_ref(),
                handle: ResizeHandle::TopLeft,
            },
            at: sample(0.0, 0.0),
        });
        // One column left, 30 minutes down: start date -1 day, start
        // time +30min.
        let event = editor.apply(GestureInput::Move {
            at: sample(-125.0, 30.0),
        });
        match event {
            Some(EditorEvent::ProposalChanged {
                start_time,
                end_time,
                day_index,
                day_span,
                ..
            }) => {
                assert_eq!(start_time, Utc.with_ymd_and_hms(2024, 3, 3, 9, 30, 0).unwrap());
                assert_eq!(end_time, Utc.with_ymd_and_hms(2024, 3, 6, 17, 0, 0).unwrap());
                assert_eq!(day_index, 0);
                assert_eq!(day_span, 4);
            }
            other => panic!("expected ProposalChanged, got {other:?}"),
        }
    }

    #[test]
    fn top_right_corner_mixes_start_time_with_end_date() {
        let mut editor = editor();
        editor.apply(GestureInput::Press {
            target: PressTarget::EventHandle {
                event: multi_day_ref(),
                handle: ResizeHandle::TopRight,
            },
            at: sample(0.0, 0.0),
        });
        let event = editor.apply(GestureInput::Move {
            at: sample(125.0, -30.0),
        });
        match event {
            Some(EditorEvent::ProposalChanged {
                start_time,
                end_time,
                day_span,
                ..
            }) => {
                // Time component lands on the start; date component on the end.
                assert_eq!(start_time, at(8, 30));
                assert_eq!(end_time, Utc.with_ymd_and_hms(2024, 3, 7, 17, 0, 0).unwrap());
                assert_eq!(day_span, 4);
            }
            other => panic!("expected ProposalChanged, got {other:?}"),
        }
    }

    #[test]
    fn corner_press_on_single_day_event_is_absorbed() {
        let mut editor = editor();
        let event = editor.apply(GestureInput::Press {
            target: PressTarget::EventHandle {
                event: event_ref(at(9, 0), at(10, 0)),
                handle: ResizeHandle::TopLeft,
            },
            at: sample(0.0, 0.0),
        });
        assert!(event.is_none());
        assert!(editor.is_idle());
    }

    #[test]
    fn presses_are_ignored_while_dragging() {
        let mut editor = editor();
        press_empty(&mut editor, at(9, 0));
        let event = editor.apply(GestureInput::Press {
            target: PressTarget::EventBody(event_ref(at(12, 0), at(13, 0))),
            at: sample(0.0, 0.0),
        });
        assert!(event.is_none());
        assert!(matches!(editor.state(), EditorState::Dragging(_)));
    }

    #[test]
    fn cancel_discards_without_side_effects() {
        let mut editor = editor();
        press_empty(&mut editor, at(9, 0));
        editor.apply(GestureInput::Move {
            at: sample(0.0, 60.0),
        });
        assert!(matches!(
            editor.apply(GestureInput::Cancel),
            Some(EditorEvent::Discarded)
        ));
        assert!(editor.is_idle());
        assert!(editor.proposed_range().is_none());
    }

    #[test]
    fn tap_outside_placeholder_discards_it() {
        let mut editor = editor();
        press_empty(&mut editor, at(9, 0));
        editor.apply(GestureInput::Release);
        let event = editor.apply(GestureInput::Press {
            target: PressTarget::Outside,
            at: sample(500.0, 500.0),
        });
        assert!(matches!(event, Some(EditorEvent::Discarded)));
        assert!(editor.is_idle());
    }

    #[test]
    fn malformed_event_bounds_are_absorbed() {
        let mut editor = editor();
        let event = editor.apply(GestureInput::Press {
            target: PressTarget::EventBody(event_ref(at(10, 0), at(9, 0))),
            at: sample(0.0, 0.0),
        });
        assert!(event.is_none());
        assert!(editor.is_idle());
    }

    proptest! {
        /// Extending a boundary never produces a delta past the pointer.
        #[test]
        fn expanding_never_overshoots_the_finger(dy in 0.0f64..600.0) {
            let mut editor = editor();
            editor.apply(GestureInput::Press {
                target: PressTarget::EventHandle {
                    event: event_ref(at(9, 0), at(10, 0)),
                    handle: ResizeHandle::Bottom,
                },
                at: sample(0.0, 0.0),
            });
            if let Some(EditorEvent::ProposalChanged { end_time, .. }) =
                editor.apply(GestureInput::Move { at: sample(0.0, dy) })
            {
                let moved = (end_time - at(10, 0)).num_minutes() as f64;
                prop_assert!(moved <= dy); // 60px/hour: px == minutes
                prop_assert!(moved >= 0.0);
            }
        }

        /// Duration is invariant under any move delta.
        #[test]
        fn move_preserves_duration(dx in -500.0f64..500.0, dy in -300.0f64..300.0) {
            let mut editor = editor();
            editor.apply(GestureInput::Press {
                target: PressTarget::EventBody(event_ref(at(11, 0), at(12, 30))),
                at: sample(0.0, 0.0),
            });
            if let Some(EditorEvent::ProposalChanged { start_time, end_time, .. }) =
                editor.apply(GestureInput::Move { at: sample(dx, dy) })
            {
                prop_assert_eq!(end_time - start_time, Duration::minutes(90));
            }
        }
    }
}
