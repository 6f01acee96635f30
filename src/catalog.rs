/*!
 * Static catalogues: collections (chapters) and voices (recitation editions).
 *
 * Both tables are immutable process-wide data and need no synchronization.
 */

use rand::Rng;
use rand::seq::IndexedRandom;

/// One collection of the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Collection number, starting at 1
    pub number: u32,
    /// Number of units in the collection
    pub unit_count: u32,
    /// Transliterated display name
    pub name: &'static str,
}

/// One voice edition of the lookup service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Edition identifier, e.g. "ar.alafasy"
    pub id: &'static str,
    /// Human readable name
    pub display_name: &'static str,
    /// Name used in output file names
    pub short_name: &'static str,
}

static VOICES: [VoiceInfo; 9] = [
    VoiceInfo { id: "ar.alafasy", display_name: "Mishary Alafasy", short_name: "Alafasy" },
    VoiceInfo { id: "ar.abdulbasitmurattal", display_name: "Abdul Basit", short_name: "AbdulBasit" },
    VoiceInfo { id: "ar.minshawi", display_name: "Al-Minshawi", short_name: "Minshawi" },
    VoiceInfo { id: "ar.husary", display_name: "Al-Husary", short_name: "Husary" },
    VoiceInfo { id: "ar.shaatree", display_name: "Ash-Shaatree", short_name: "Shaatree" },
    VoiceInfo { id: "ar.abdurrahmaansudais", display_name: "Abdurrahman As-Sudais", short_name: "Sudais" },
    VoiceInfo { id: "ar.mahermuaiqly", display_name: "Maher Al-Muaiqly", short_name: "Muaiqly" },
    VoiceInfo { id: "ar.muhammadayyoub", display_name: "Muhammad Ayyub", short_name: "Ayyub" },
    VoiceInfo { id: "ar.saadalghaamidi", display_name: "Saad Al-Ghamadi", short_name: "Ghamadi" },
];

// (unit count, name), indexed by collection number - 1
static COLLECTIONS: [(u32, &str); 114] = [
    (7, "Al-Fatiha"), (286, "Al-Baqarah"), (200, "Aal-E-Imran"), (176, "An-Nisa"),
    (120, "Al-Maidah"), (165, "Al-Anam"), (206, "Al-Araf"), (75, "Al-Anfal"),
    (129, "At-Tawbah"), (109, "Yunus"), (123, "Hud"), (111, "Yusuf"),
    (43, "Ar-Rad"), (52, "Ibrahim"), (99, "Al-Hijr"), (128, "An-Nahl"),
    (111, "Al-Isra"), (110, "Al-Kahf"), (98, "Maryam"), (135, "Ta-Ha"),
    (112, "Al-Anbiya"), (78, "Al-Hajj"), (118, "Al-Muminun"), (64, "An-Nur"),
    (77, "Al-Furqan"), (227, "Ash-Shuara"), (93, "An-Naml"), (88, "Al-Qasas"),
    (69, "Al-Ankabut"), (60, "Ar-Rum"), (34, "Luqman"), (30, "As-Sajdah"),
    (73, "Al-Ahzab"), (54, "Saba"), (45, "Fatir"), (83, "Ya-Sin"),
    (182, "As-Saffat"), (88, "Sad"), (75, "Az-Zumar"), (85, "Ghafir"),
    (54, "Fussilat"), (53, "Ash-Shura"), (89, "Az-Zukhruf"), (59, "Ad-Dukhan"),
    (37, "Al-Jathiyah"), (35, "Al-Ahqaf"), (38, "Muhammad"), (29, "Al-Fath"),
    (18, "Al-Hujurat"), (45, "Qaf"), (60, "Adh-Dhariyat"), (49, "At-Tur"),
    (62, "An-Najm"), (55, "Al-Qamar"), (78, "Ar-Rahman"), (96, "Al-Waqiah"),
    (29, "Al-Hadid"), (22, "Al-Mujadila"), (24, "Al-Hashr"), (13, "Al-Mumtahanah"),
    (14, "As-Saff"), (11, "Al-Jumuah"), (11, "Al-Munafiqun"), (18, "At-Taghabun"),
    (12, "At-Talaq"), (12, "At-Tahrim"), (30, "Al-Mulk"), (52, "Al-Qalam"),
    (52, "Al-Haqqah"), (44, "Al-Maarij"), (28, "Nuh"), (28, "Al-Jinn"),
    (20, "Al-Muzzammil"), (56, "Al-Muddaththir"), (40, "Al-Qiyamah"), (31, "Al-Insan"),
    (50, "Al-Mursalat"), (40, "An-Naba"), (46, "An-Naziat"), (42, "Abasa"),
    (29, "At-Takwir"), (19, "Al-Infitar"), (36, "Al-Mutaffifin"), (25, "Al-Inshiqaq"),
    (22, "Al-Buruj"), (17, "At-Tariq"), (19, "Al-Ala"), (26, "Al-Ghashiyah"),
    (30, "Al-Fajr"), (20, "Al-Balad"), (15, "Ash-Shams"), (21, "Al-Layl"),
    (11, "Ad-Duha"), (8, "Ash-Sharh"), (8, "At-Tin"), (19, "Al-Alaq"),
    (5, "Al-Qadr"), (8, "Al-Bayyinah"), (8, "Az-Zalzalah"), (11, "Al-Adiyat"),
    (11, "Al-Qariah"), (8, "At-Takathur"), (3, "Al-Asr"), (9, "Al-Humazah"),
    (5, "Al-Fil"), (4, "Quraysh"), (7, "Al-Maun"), (3, "Al-Kawthar"),
    (6, "Al-Kafirun"), (3, "An-Nasr"), (5, "Al-Masad"), (4, "Al-Ikhlas"),
    (5, "Al-Falaq"), (6, "An-Nas"),
];

/// Number of collections in the catalogue
pub fn collection_count() -> u32 {
    COLLECTIONS.len() as u32
}

/// Look up a collection by number
pub fn collection(number: u32) -> Option<CollectionInfo> {
    let index = usize::try_from(number).ok()?.checked_sub(1)?;
    COLLECTIONS.get(index).map(|(unit_count, name)| CollectionInfo {
        number,
        unit_count: *unit_count,
        name,
    })
}

/// Display name of a collection, with a generic name for unknown numbers
pub fn collection_name(number: u32) -> String {
    collection(number)
        .map(|info| info.name.to_string())
        .unwrap_or_else(|| format!("Collection{}", number))
}

/// Pick a random collection
pub fn random_collection<R: Rng + ?Sized>(rng: &mut R) -> CollectionInfo {
    let number = rng.random_range(1..=collection_count());
    // number is always within the table
    collection(number).unwrap_or(CollectionInfo { number: 1, unit_count: COLLECTIONS[0].0, name: COLLECTIONS[0].1 })
}

/// All known voices
pub fn voices() -> &'static [VoiceInfo] {
    &VOICES
}

/// Look up a voice by edition identifier
pub fn voice(id: &str) -> Option<&'static VoiceInfo> {
    VOICES.iter().find(|v| v.id == id)
}

/// Short name for a voice; unknown editions drop their language prefix
pub fn voice_short_name(id: &str) -> String {
    match voice(id) {
        Some(info) => info.short_name.to_string(),
        None => id.split_once('.').map(|(_, rest)| rest).unwrap_or(id).to_string(),
    }
}

/// Pick a random voice
pub fn random_voice<R: Rng + ?Sized>(rng: &mut R) -> &'static VoiceInfo {
    VOICES.choose(rng).unwrap_or(&VOICES[0])
}
