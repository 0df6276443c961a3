//! Tesauro-style board features.
//!
//! Layout of the 196 slots, all from the perspective of `player`:
//!
//! ```text
//! 0..96     own points 0..23, four slots each
//! 96..192   opponent points 0..23 (opponent's own coordinates), four slots each
//! 192       own bar / 2
//! 193       opponent bar / 2
//! 194       own borne off / 15
//! 195       opponent borne off / 15
//! ```
//!
//! Per point with `n` pieces: slot 0 is 1 for a blot, slot 1 is 1 for exactly
//! two, slot 2 is 1 for exactly three, slot 3 is `(n - 3) / 2` above three.

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::{Board, Player, NUM_POINTS};

pub const NUM_FEATURES: usize = 196;

const OPPONENT_OFFSET: usize = NUM_POINTS * 4;
const SCALAR_OFFSET: usize = 2 * NUM_POINTS * 4;
const REMOVED_SCALE: f32 = 15.0;

pub type Features = [f32; NUM_FEATURES];

/// Which arrangement of the four scalar slots to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLayout {
    /// Four distinct scalar slots.
    #[default]
    Tesauro,
    /// Reproduces older trained models: slot 193 holds own pieces still on
    /// the points / 15 (the opponent bar is dropped), slot 194 stays zero and
    /// slot 195 holds opponent pieces still on the points / 15.
    Legacy,
}

/// Encode `board` from `player`'s point of view.
pub fn encode(board: &Board, player: Player, layout: FeatureLayout) -> Features {
    let mut features = [0.0f32; NUM_FEATURES];
    let opponent = player.other();

    for p in 0..NUM_POINTS {
        encode_point(&mut features[p * 4..p * 4 + 4], board.point(player, p));
        let offset = OPPONENT_OFFSET + p * 4;
        encode_point(&mut features[offset..offset + 4], board.point(opponent, p));
    }

    let own_bar = board.bar(player) as f32 / 2.0;
    let their_bar = board.bar(opponent) as f32 / 2.0;
    let own_removed = board.removed(player) as f32 / REMOVED_SCALE;
    let their_removed = board.removed(opponent) as f32 / REMOVED_SCALE;

    match layout {
        FeatureLayout::Tesauro => {
            features[SCALAR_OFFSET] = own_bar;
            features[SCALAR_OFFSET + 1] = their_bar;
            features[SCALAR_OFFSET + 2] = own_removed;
            features[SCALAR_OFFSET + 3] = their_removed;
        }
        FeatureLayout::Legacy => {
            features[SCALAR_OFFSET] = own_bar;
            features[SCALAR_OFFSET + 1] = on_points(board, player) / REMOVED_SCALE;
            features[SCALAR_OFFSET + 3] = on_points(board, opponent) / REMOVED_SCALE;
        }
    }

    features
}

fn on_points(board: &Board, player: Player) -> f32 {
    board.points(player).iter().map(|&n| n as f32).sum()
}

fn encode_point(slots: &mut [f32], count: u8) {
    match count {
        0 => {}
        1 => slots[0] = 1.0,
        2 => slots[1] = 1.0,
        3 => slots[2] = 1.0,
        n => slots[3] = (n as f32 - 3.0) / 2.0,
    }
}

/// Stack feature vectors into a `[batch, 196]` tensor.
pub fn features_batch<B: Backend>(batch: &[Features], device: &B::Device) -> Tensor<B, 2> {
    let mut flat = Vec::with_capacity(batch.len() * NUM_FEATURES);
    for features in batch {
        flat.extend_from_slice(features);
    }
    Tensor::from_data(TensorData::new(flat, [batch.len(), NUM_FEATURES]), device)
}
