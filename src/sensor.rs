use crate::constants::MAX_PENDING_MOTION;
use hydro_core::{AccelSample, AccelerometerSource, HydroError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `accelerationIncludingGravity` components -> sample. Browsers without a
/// sensor fire the event with null axes; those readings are dropped.
#[inline]
pub fn motion_sample(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Option<AccelSample> {
    let sample = AccelSample::new(x? as f32, y? as f32, z.unwrap_or(0.0) as f32);
    (sample.x.is_finite() && sample.y.is_finite()).then_some(sample)
}

#[inline]
pub fn push_bounded(queue: &mut VecDeque<AccelSample>, sample: AccelSample) {
    while queue.len() >= MAX_PENDING_MOTION {
        queue.pop_front();
    }
    queue.push_back(sample);
}

/// `devicemotion` listener on the window. The listener is attached on
/// subscribe and removed on unsubscribe.
#[derive(Default)]
pub struct DeviceMotionSensor {
    pending: Rc<RefCell<VecDeque<AccelSample>>>,
    callback: Option<Closure<dyn FnMut(web::DeviceMotionEvent)>>,
}

impl DeviceMotionSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccelerometerSource for DeviceMotionSensor {
    fn subscribe(&mut self) -> hydro_core::Result<()> {
        let window = web::window()
            .ok_or_else(|| HydroError::SensorUnavailable("no window".into()))?;
        let supported = js_sys::Reflect::has(&window, &"DeviceMotionEvent".into()).unwrap_or(false);
        if !supported {
            return Err(HydroError::SensorUnavailable(
                "DeviceMotionEvent not supported".into(),
            ));
        }
        let pending = self.pending.clone();
        let callback = Closure::wrap(Box::new(move |ev: web::DeviceMotionEvent| {
            let Some(acc) = ev.acceleration_including_gravity() else {
                return;
            };
            if let Some(sample) = motion_sample(acc.x(), acc.y(), acc.z()) {
                push_bounded(&mut pending.borrow_mut(), sample);
            }
        }) as Box<dyn FnMut(_)>);
        window
            .add_event_listener_with_callback("devicemotion", callback.as_ref().unchecked_ref())
            .map_err(|e| HydroError::SensorUnavailable(format!("{:?}", e)))?;
        self.callback = Some(callback);
        log::info!("[tilt] devicemotion listener attached");
        Ok(())
    }

    fn poll(&mut self) -> Option<AccelSample> {
        self.pending.borrow_mut().pop_front()
    }

    fn unsubscribe(&mut self) {
        if let Some(callback) = self.callback.take() {
            if let Some(window) = web::window() {
                _ = window.remove_event_listener_with_callback(
                    "devicemotion",
                    callback.as_ref().unchecked_ref(),
                );
            }
        }
        self.pending.borrow_mut().clear();
    }
}
