//! Frame compositor: writes one synthesized talking frame into the output buffer.

use crate::buffer::WeightBuffer;
use crate::catalog::Group;
use crate::resolver::CapabilityMap;
use crate::sequence::Frame;

/// Zero every bound mouth/jaw channel.
pub fn reset_speech_channels(buffer: &mut [f32], caps: &CapabilityMap) {
    WeightBuffer::new(buffer, caps).zero_groups(Group::is_speech);
}

/// Apply `frame` to `buffer`.
///
/// 1. Every bound mouth/jaw channel is zeroed so shapes from the previous
///    frame cannot linger on channels this frame does not mention.
/// 2. Each frame weight with a binding is written, capped at the catalog max.
///
/// Unbound names are skipped.
pub fn apply_frame(buffer: &mut [f32], caps: &CapabilityMap, frame: &Frame) {
    let mut buf = WeightBuffer::new(buffer, caps);
    buf.zero_groups(Group::is_speech);
    for (name, weight) in &frame.weights {
        buf.set_clamped(name, *weight);
    }
}
