//! Curated topics for the "Random" action.

use rand::Rng;

#[rustfmt::skip]
const PREDEFINED_WORDS: &[&str] = &[
    // Opposites
    "Balance", "Harmony", "Discord", "Unity", "Fragmentation", "Clarity", "Ambiguity", "Presence",
    "Absence", "Creation", "Destruction", "Light", "Shadow", "Beginning", "Ending", "Rising",
    "Falling", "Connection", "Isolation", "Hope", "Despair",
    "Order and chaos", "Light and shadow", "Sound and silence", "Form and formlessness",
    "Being and nonbeing", "Presence and absence", "Motion and stillness", "Unity and multiplicity",
    "Finite and infinite", "Sacred and profane", "Memory and forgetting", "Question and answer",
    "Search and discovery", "Journey and destination", "Dream and reality", "Time and eternity",
    "Self and other", "Known and unknown", "Spoken and unspoken", "Visible and invisible",
    // Motion
    "Zigzag", "Waves", "Spiral", "Bounce", "Slant", "Drip", "Stretch", "Squeeze", "Float", "Fall",
    "Spin", "Melt", "Rise", "Twist", "Explode", "Stack", "Mirror", "Echo", "Vibrate",
    // Physics
    "Gravity", "Friction", "Momentum", "Inertia", "Turbulence", "Pressure", "Tension", "Oscillate",
    "Fractal", "Quantum", "Entropy", "Vortex", "Resonance", "Equilibrium", "Centrifuge", "Elastic",
    "Viscous", "Refract", "Diffuse", "Cascade", "Levitate", "Magnetize", "Polarize", "Accelerate",
    "Compress", "Undulate",
    // Abstractions
    "Liminal", "Ephemeral", "Paradox", "Zeitgeist", "Metamorphosis", "Synesthesia", "Recursion",
    "Emergence", "Dialectic", "Apophenia", "Limbo", "Flux", "Sublime", "Uncanny", "Palimpsest",
    "Chimera", "Void", "Transcend", "Ineffable", "Qualia", "Gestalt", "Simulacra", "Abyssal",
    // Philosophy and literature
    "Existential", "Nihilism", "Solipsism", "Phenomenology", "Hermeneutics", "Deconstruction",
    "Postmodern", "Absurdism", "Catharsis", "Epiphany", "Melancholy", "Nostalgia", "Longing",
    "Reverie", "Pathos", "Ethos", "Logos", "Mythos", "Anamnesis", "Intertextuality", "Metafiction",
    "Stream", "Lacuna", "Caesura", "Enjambment",
];

pub struct RandomTopics {
    words: Vec<String>,
}

impl Default for RandomTopics {
    fn default() -> Self {
        Self::new(PREDEFINED_WORDS.iter().copied())
    }
}

impl RandomTopics {
    /// Builds the candidate set, keeping the first occurrence of each word.
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for word in words {
            if !unique.iter().any(|w| w == word) {
                unique.push(word.to_string());
            }
        }
        Self { words: unique }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Picks a topic uniformly, stepping to the next candidate when the pick
    /// would repeat `current`.
    pub fn pick<R: Rng>(&self, current: &str, rng: &mut R) -> Option<&str> {
        if self.words.is_empty() {
            return None;
        }
        let mut idx = rng.gen_range(0..self.words.len());
        if self.words.len() > 1 && self.words[idx].to_lowercase() == current.to_lowercase() {
            idx = (idx + 1) % self.words.len();
        }
        Some(&self.words[idx])
    }
}
