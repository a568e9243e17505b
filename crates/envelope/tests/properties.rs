//! Property-based tests for envelope value semantics.

use envelope::{Message, MessageType, Tensor, TensorData};
use proptest::prelude::*;

fn arb_kind() -> impl Strategy<Value = MessageType> {
    prop::sample::select(MessageType::ALL.to_vec())
}

fn arb_tensor() -> impl Strategy<Value = Tensor> {
    prop_oneof![
        prop::collection::vec(-1.0e6f32..1.0e6, 0..16).prop_map(Tensor::vector),
        prop::collection::vec(any::<i64>(), 0..16).prop_map(Tensor::vector),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Tensor::vector),
        (1usize..4, 1usize..4).prop_flat_map(|(rows, cols)| {
            prop::collection::vec(any::<bool>(), rows * cols)
                .prop_map(move |values| Tensor::new(vec![rows, cols], values).unwrap())
        }),
    ]
}

prop_compose! {
    fn arb_message()(
        metadata in prop::collection::vec(any::<u8>(), 0..64),
        payloads in prop::collection::vec(arb_tensor(), 0..4),
        kind in arb_kind(),
        id in any::<i64>(),
    ) -> Message {
        Message::with_id(metadata, payloads, kind, id)
    }
}

proptest! {
    /// Property: classification predicates never overlap
    #[test]
    fn prop_predicates_exclusive(message in arb_message()) {
        let hits = [message.is_request(), message.is_response(), message.is_shutdown()]
            .iter()
            .filter(|hit| **hit)
            .count();
        if message.kind() == MessageType::Unknown {
            prop_assert_eq!(hits, 0);
        } else {
            prop_assert_eq!(hits, 1);
        }
    }

    /// Property: clone preserves every field
    #[test]
    fn prop_clone_equal(message in arb_message()) {
        let copy = message.clone();
        prop_assert_eq!(copy.metadata(), message.metadata());
        prop_assert_eq!(copy.payloads(), message.payloads());
        prop_assert_eq!(copy.kind(), message.kind());
        prop_assert_eq!(copy.id(), message.id());
    }

    /// Property: take moves everything and leaves a default message
    #[test]
    fn prop_take_transfers(message in arb_message()) {
        let expected = message.clone();
        let mut source = message;
        let moved = source.take();
        prop_assert_eq!(moved, expected);
        prop_assert_eq!(source, Message::default());
    }

    /// Property: swap is its own inverse
    #[test]
    fn prop_swap_involution(a in arb_message(), b in arb_message()) {
        let (mut x, mut y) = (a.clone(), b.clone());
        x.swap(&mut y);
        prop_assert_eq!(&x, &b);
        prop_assert_eq!(&y, &a);
        x.swap(&mut y);
        prop_assert_eq!(x, a);
        prop_assert_eq!(y, b);
    }

    /// Property: set_id then id returns the value set
    #[test]
    fn prop_set_id_read_back(message in arb_message(), id in any::<i64>()) {
        let mut message = message;
        message.set_id(id);
        prop_assert_eq!(message.id(), id);
        prop_assert_eq!(message.correlation().is_none(), id == -1);
    }

    /// Property: payload order survives construction
    #[test]
    fn prop_payload_order(values in prop::collection::vec(any::<i32>(), 1..8)) {
        let payloads: Vec<Tensor> = values.iter().map(|v| Tensor::vector(vec![*v])).collect();
        let message = Message::new(vec![], payloads, MessageType::OperationRequest);
        for (tensor, value) in message.payloads().iter().zip(&values) {
            prop_assert_eq!(tensor.data(), &TensorData::I32(vec![*value]));
        }
    }
}
