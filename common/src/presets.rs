//! 組み込みフィルタ定義
//!
//! 2つのフロー（フレーム検出・アップロード）で語彙が異なる。
//! 統一はせず、それぞれ名前付きの設定として持つ。

/// フレーム検出用の許可語彙
pub const FRAME_VOCABULARY: &[&str] = &[
    "Bench Press",
    "Treadmill",
    "Gym Weights",
    "Dumbbell",
    "Barbell",
    "Squat Rack",
    "Kettlebell",
    "Resistance Band",
    "Rowing Machine",
    "Weight Plate",
    "Exercise Bike",
    "Lat Pulldown Machine",
    "Cable Crossover",
    "Smith Machine",
    "Gym",
    "Fitness",
    "Sport",
    "Workout",
    "Exercise",
    "Bodybuilding",
];

/// アップロード用の許可語彙（エイリアス変換後の名前を含む）
pub const UPLOAD_VOCABULARY: &[&str] = &[
    "Dumbbells / Barbells",
    "Dumbbell",
    "Barbell",
    "Kettlebell",
    "Treadmill",
    "Weight Bench",
    "Squat Rack",
    "Leg Press Machine",
    "Resistance Band",
    "Exercise Bike",
    "Rowing Machine",
    "Pull-up Bar",
    "Workout Machine",
    "Strength Equipment",
    "Bench Press",
    "Plates",
    "Barbell Rack",
    "Dumbbell Rack",
    "Home Gym",
];

/// アップロード用のラベル変換表（プロバイダのラベル → 器具名）
pub const UPLOAD_ALIASES: &[(&str, &str)] = &[
    ("Gym Weights", "Dumbbells / Barbells"),
    ("Dead Lift", "Barbell"),
    ("Bicep Curls", "Dumbbells"),
    ("Bench Press", "Weight Bench"),
    ("Squat", "Squat Rack"),
    ("Leg Press", "Leg Press Machine"),
    ("Rowing Machine", "Rowing Machine"),
];

/// アップロード用の除外名（汎用カテゴリ）
pub const UPLOAD_EXCLUSIONS: &[&str] = &["Fitness", "Gym"];
