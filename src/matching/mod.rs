// Matching — pairing a detected play with a row from the animation catalog.

pub mod score;
