//! Registration of the built-in operation catalog
//!
//! Hosts call [`register_builtins`] once at startup to populate an
//! [`OperationRegistry`] with every operation this crate ships.

use std::sync::Arc;

use op_engine::{CallbackOperation, OperationRegistry};

use crate::{collect, math, text};

/// Register every built-in operation into `registry`
pub fn register_builtins(registry: &mut OperationRegistry) {
    registry.register(
        math::multiply_descriptor(),
        Arc::new(CallbackOperation::new(math::multiply)),
    );
    registry.register(
        math::power_descriptor(),
        Arc::new(CallbackOperation::new(math::power)),
    );
    registry.register(
        math::offset_descriptor(),
        Arc::new(CallbackOperation::new(math::offset)),
    );
    registry.register(
        text::concat_descriptor(),
        Arc::new(CallbackOperation::new(text::concat)),
    );
    registry.register(
        text::upper_descriptor(),
        Arc::new(CallbackOperation::new(text::upper)),
    );
    registry.register(
        collect::merge_descriptor(),
        Arc::new(CallbackOperation::new(collect::merge)),
    );

    log::debug!("registered {} built-in operations", registry.op_ids().len());
}
