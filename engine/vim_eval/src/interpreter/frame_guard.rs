//! RAII guard for call frames.
//!
//! [`FrameGuard`] pops the frame it pushed when dropped, on the error path
//! as well as on success, so an error raised inside a callee never leaves
//! its `l:`/`a:` visible to the caller.
//!
//! The guard holds `&mut Interpreter` and implements `Deref`/`DerefMut`,
//! so the callee body is evaluated straight through it.

use std::ops::{Deref, DerefMut};

use super::Interpreter;
use crate::environment::Frame;

pub struct FrameGuard<'a> {
    interpreter: &'a mut Interpreter,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_frame();
    }
}

impl Deref for FrameGuard<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push `frame` for the lifetime of the returned guard.
    pub fn enter_frame(&mut self, frame: Frame) -> FrameGuard<'_> {
        self.env.push_frame(frame);
        FrameGuard { interpreter: self }
    }
}
