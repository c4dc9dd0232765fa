//! Vulkan vertex-input plumbing for [`StaticVertex`].
//!
//! This is the hand-off point between the packed vertex records and the
//! pipeline layer: one tightly-packed binding whose attribute offsets
//! mirror the on-disk struct layout.

use std::mem::{offset_of, size_of};

use ash::vk;

use crate::mesh::StaticVertex;

/// Vertex bindings and attributes for building a graphics pipeline.
pub struct VertexInputDescription {
    pub bindings: Vec<vk::VertexInputBindingDescription>,
    pub attributes: Vec<vk::VertexInputAttributeDescription>,
}

impl StaticVertex {
    /// Describe the vertex layout of a packed mesh file to Vulkan.
    ///
    /// Binding 0 carries the whole interleaved record at vertex rate;
    /// locations are position (0), normal (1), uv (2), tangent (3).
    pub fn vertex_input_description() -> VertexInputDescription {
        let bindings = vec![vk::VertexInputBindingDescription::default()
            .binding(0)
            .stride(size_of::<StaticVertex>() as u32)
            .input_rate(vk::VertexInputRate::VERTEX)];

        let attributes = vec![
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(0)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(offset_of!(StaticVertex, position) as u32),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(1)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(offset_of!(StaticVertex, normal) as u32),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(2)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(offset_of!(StaticVertex, uv) as u32),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(3)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(offset_of!(StaticVertex, tangent) as u32),
        ];

        VertexInputDescription {
            bindings,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_input_layout() {
        let desc = StaticVertex::vertex_input_description();

        assert_eq!(desc.bindings.len(), 1);
        assert_eq!(desc.bindings[0].stride, 44);
        assert_eq!(desc.bindings[0].input_rate, vk::VertexInputRate::VERTEX);

        assert_eq!(desc.attributes.len(), 4);
        // The record interleaves position, uv, normal, tangent; the
        // attributes list them in location order.
        let offsets: Vec<u32> = desc.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 20, 12, 32]);
        assert!(desc.attributes.iter().all(|a| a.binding == 0));
    }
}
