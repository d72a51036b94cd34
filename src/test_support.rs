//! Shared test doubles: recording surfaces, canned sequences and a timer driver.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use image::RgbaImage;

use crate::core::scheduler::{ManualClock, Scheduler, TaskHandle, TimerTarget};
use crate::entities::{
    ControlState, ControlSurface, Fetch, Frame, FrameOrigin, FrameSequence, LoadError, LoadOutcome, LoadResult,
    Rect, RenderSurface,
};

#[derive(Debug, Default)]
struct PaintLog {
    size: (u32, u32),
    paints: usize,
    clears: usize,
    last_label: Option<String>,
    last_dest: Option<Rect>,
}

/// Render surface that records paints; clones share the record
#[derive(Debug, Clone, Default)]
pub(crate) struct PaintProbe(Rc<RefCell<PaintLog>>);

impl PaintProbe {
    pub fn new(width: u32, height: u32) -> Self {
        Self(Rc::new(RefCell::new(PaintLog {
            size: (width, height),
            ..Default::default()
        })))
    }

    pub fn count(&self) -> usize {
        self.0.borrow().paints
    }

    pub fn clears(&self) -> usize {
        self.0.borrow().clears
    }

    pub fn last_label(&self) -> Option<String> {
        self.0.borrow().last_label.clone()
    }

    pub fn last_dest(&self) -> Option<Rect> {
        self.0.borrow().last_dest
    }
}

impl RenderSurface for PaintProbe {
    fn size(&self) -> (u32, u32) {
        self.0.borrow().size
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clears += 1;
    }

    fn paint(&mut self, frame: &Frame, dest: Rect) {
        let mut log = self.0.borrow_mut();
        log.paints += 1;
        log.last_label = Some(frame.label().to_string());
        log.last_dest = Some(dest);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.0.borrow_mut().size = (width, height);
    }
}

/// Control surface that records every refresh; clones share the record
#[derive(Debug, Clone, Default)]
pub(crate) struct ControlProbe(Rc<RefCell<Vec<ControlState>>>);

impl ControlProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<ControlState> {
        self.0.borrow().last().copied()
    }

    pub fn count(&self) -> usize {
        self.0.borrow().len()
    }
}

impl ControlSurface for ControlProbe {
    fn refresh(&mut self, state: &ControlState) {
        self.0.borrow_mut().push(*state);
    }
}

/// Loaded 4x4 sequence labelled like the resource loader does
pub(crate) fn loaded(frames: usize) -> LoadResult {
    let cover = Frame::new(RgbaImage::new(4, 4), "cover", FrameOrigin::File("cover.png".into()));
    let frames = (0..frames)
        .map(|i| {
            Frame::new(
                RgbaImage::new(4, 4),
                format!("frame {}", i + 1),
                FrameOrigin::File(format!("f.{:04}.png", i + 1)),
            )
        })
        .collect();
    LoadResult {
        sequence: FrameSequence::new(cover, frames),
        outcome: LoadOutcome::Loaded,
    }
}

/// Serves a 4x4 tile for every reference
pub(crate) struct TileFetcher;

impl Fetch for TileFetcher {
    fn fetch(&self, _reference: &str) -> Result<RgbaImage, LoadError> {
        Ok(RgbaImage::new(4, 4))
    }
}

pub(crate) struct FailingFetcher;

impl Fetch for FailingFetcher {
    fn fetch(&self, reference: &str) -> Result<RgbaImage, LoadError> {
        Err(LoadError::Missing(reference.to_string()))
    }
}

/// Step the clock through every deadline up to `t`, firing due tasks in order.
pub(crate) fn run_until(
    clock: &ManualClock,
    sched: &mut Scheduler,
    t: Duration,
    mut fire: impl FnMut(TaskHandle, TimerTarget, &mut Scheduler),
) {
    while let Some(deadline) = sched.next_deadline().filter(|d| *d <= t) {
        clock.set(deadline);
        while let Some((handle, target)) = sched.pop_due() {
            fire(handle, target, sched);
        }
    }
    clock.set(t);
}
