//! Memory bound of `MessageCodec::encode` under a frame limit.
//!
//! Lives in its own test binary: the global allocator below watches every
//! allocation in the process, so no other test may run beside it.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use envelope::{Message, MessageType, Tensor};
use streaming::{CodecConfig, MessageCodec, StreamingError};

struct PeakAlloc;

static LARGEST: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for PeakAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        LARGEST.fetch_max(layout.size(), Ordering::Relaxed);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        LARGEST.fetch_max(new_size, Ordering::Relaxed);
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: PeakAlloc = PeakAlloc;

#[test]
fn test_rejected_frame_is_never_allocated() {
    let message = Message::new(
        vec![],
        vec![Tensor::vector(vec![0u8; 32 << 20])],
        MessageType::OperationRequest,
    );
    let codec = MessageCodec::new(CodecConfig::new().with_max_frame_len(64));

    LARGEST.store(0, Ordering::Relaxed);
    let result = codec.encode(&message);
    let largest = LARGEST.load(Ordering::Relaxed);

    assert!(matches!(result, Err(StreamingError::FrameTooLarge { limit: 64, .. })));
    assert!(largest < 1 << 20, "encode allocated {largest} bytes");
}
