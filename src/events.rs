use crate::app::AppState;
use crate::dom::EventListener;
use crate::input;
use glam::Vec2;
use hydro_core::{PointerEvent, PointerKind};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

const POINTER_EVENTS: [&str; 4] = ["pointerdown", "pointermove", "pointerup", "pointercancel"];

/// Attach every page listener. Dropping the returned list detaches them.
pub fn wire_input_handlers(
    window: &web::Window,
    document: &web::Document,
    canvas: &web::HtmlCanvasElement,
    app: &Rc<RefCell<AppState>>,
) -> Vec<EventListener> {
    let active = Rc::new(RefCell::new(input::ActivePointer::default()));
    let mut listeners: Vec<EventListener> = POINTER_EVENTS
        .iter()
        .filter_map(|kind| wire_pointer(canvas, app, &active, kind))
        .collect();
    listeners.extend(wire_keydown(window, app));
    listeners.extend(wire_visibility(document, app));
    listeners
}

fn wire_pointer(
    canvas: &web::HtmlCanvasElement,
    app: &Rc<RefCell<AppState>>,
    active: &Rc<RefCell<input::ActivePointer>>,
    kind: &'static str,
) -> Option<EventListener> {
    let app = app.clone();
    let active = active.clone();
    let target = canvas.clone();
    EventListener::new(canvas, kind, move |ev: web::Event| {
        let Ok(ev) = ev.dyn_into::<web::PointerEvent>() else {
            return;
        };
        let Some(kind) = input::pointer_kind(&ev.type_()) else {
            return;
        };
        if !active.borrow_mut().accept(kind, ev.pointer_id()) {
            return;
        }
        let rect = target.get_bounding_client_rect();
        let pos = input::client_to_canvas_px(
            Vec2::new(ev.client_x() as f32, ev.client_y() as f32),
            Vec2::new(rect.left() as f32, rect.top() as f32),
            Vec2::new(rect.width() as f32, rect.height() as f32),
            Vec2::new(target.width() as f32, target.height() as f32),
        );
        let t = input::event_time_ms(ev.time_stamp());
        let event = match kind {
            PointerKind::Down => {
                _ = target.set_pointer_capture(ev.pointer_id());
                PointerEvent::down(pos, t)
            }
            PointerKind::Move => PointerEvent::moved(pos, t),
            PointerKind::Up => PointerEvent::up(pos, t),
            PointerKind::Cancel => PointerEvent::cancel(t),
        };
        app.borrow_mut().pointer(&event);
        ev.prevent_default();
    })
}

fn wire_keydown(window: &web::Window, app: &Rc<RefCell<AppState>>) -> Option<EventListener> {
    let app = app.clone();
    EventListener::new(window, "keydown", move |ev: web::Event| {
        let Ok(ev) = ev.dyn_into::<web::KeyboardEvent>() else {
            return;
        };
        if ev.repeat() {
            return;
        }
        if let Some(action) = input::key_action(&ev.key()) {
            app.borrow_mut().key(action);
            ev.prevent_default();
        }
    })
}

/// Coming back to the tab fires a shockwave from the bottom centre.
fn wire_visibility(document: &web::Document, app: &Rc<RefCell<AppState>>) -> Option<EventListener> {
    let app = app.clone();
    let doc = document.clone();
    EventListener::new(document, "visibilitychange", move |_| {
        if !doc.hidden() {
            log::info!("[page] tab visible again");
            app.borrow_mut().shockwave(None);
        }
    })
}
