//! Emergency escalation table.
//!
//! Rules are ordered by clinical urgency. Detection returns the first rule,
//! in declaration order, that has any keyword contained in the query. Later
//! rules never win on specificity, so reordering this table changes behavior.

/// A fixed keyword set mapped to an escalation message.
#[derive(Debug)]
pub struct EmergencyRule {
    /// Stable identifier for logs.
    pub name: &'static str,
    /// Lowercase trigger phrases, checked in order.
    pub keywords: &'static [&'static str],
    /// Returned verbatim to the patient.
    pub message: &'static str,
}

impl EmergencyRule {
    /// First keyword of this rule contained in an already-lowercased query.
    fn first_hit(&self, lower: &str) -> Option<&'static str> {
        self.keywords.iter().copied().find(|k| lower.contains(k))
    }
}

pub static EMERGENCY_RULES: &[EmergencyRule] = &[
    EmergencyRule {
        name: "chest_pain",
        keywords: &[
            "chest pain",
            "chest hurt",
            "heart pain",
            "heart attack",
            "chest pressure",
            "chest tightness",
            "crushing chest",
            "squeezing chest",
            "chest discomfort",
            "angina",
        ],
        message: "⚠️ **URGENT: This could be a medical emergency!**\n\nChest pain can indicate serious conditions like a heart attack. Please seek immediate medical attention by calling emergency services or visiting the nearest emergency room right away. Do not delay or try to treat this at home.",
    },
    EmergencyRule {
        name: "breathing_difficulty",
        keywords: &[
            "difficulty breathing",
            "can't breathe",
            "cannot breathe",
            "breathless",
            "choking",
            "gasping",
            "shortness of breath",
            "hard to breathe",
            "suffocating",
            "struggling to breathe",
            "breath trouble",
            "breathing problem",
        ],
        message: "⚠️ **URGENT: This is a medical emergency!**\n\nDifficulty breathing requires immediate medical attention. Please call emergency services or go to the nearest emergency room immediately. This could indicate a serious respiratory or cardiac condition that needs urgent care.",
    },
    EmergencyRule {
        name: "pregnancy_complication",
        keywords: &[
            "pregnancy pain",
            "pregnant pain",
            "pregnant bleeding",
            "pregnancy bleeding",
            "miscarriage",
            "pregnancy cramps",
            "severe pregnancy pain",
            "pregnancy emergency",
            "bleeding while pregnant",
            "pregnancy complications",
        ],
        message: "⚠️ **URGENT: Seek immediate medical care!**\n\nAny unusual pain or bleeding during pregnancy should be evaluated immediately by a healthcare professional. Please contact your obstetrician or visit the emergency room right away to ensure the safety of both you and your baby.",
    },
    EmergencyRule {
        name: "sudden_severe_headache",
        keywords: &[
            "severe headache",
            "worst headache",
            "thunderclap headache",
            "sudden headache",
            "explosive headache",
            "headache worst ever",
            "sudden severe head pain",
            "head bursting",
        ],
        message: "⚠️ **URGENT: This requires immediate attention!**\n\nA sudden severe headache (especially if it's the worst headache you've ever experienced) could indicate a serious condition like a stroke or aneurysm or brain bleed. Please seek emergency medical care immediately.",
    },
    EmergencyRule {
        name: "stroke",
        keywords: &[
            "numbness",
            "tingling one side",
            "face drooping",
            "slurred speech",
            "weakness one side",
            "stroke",
            "paralysis",
            "arm weakness",
            "leg weakness",
            "face paralysis",
            "one side weak",
            "droopy face",
            "speech slurred",
        ],
        message: "⚠️ **URGENT: Possible stroke symptoms!**\n\nThese symptoms could indicate a stroke which is a medical emergency. Remember: TIME IS CRITICAL. Call emergency services immediately. Every minute counts in stroke treatment.",
    },
    EmergencyRule {
        name: "suicidal_ideation",
        keywords: &[
            "suicidal",
            "want to die",
            "kill myself",
            "end my life",
            "suicide",
            "no reason to live",
            "self harm",
            "hurt myself",
            "thoughts of suicide",
            "suicidal thoughts",
        ],
        message: "⚠️ **URGENT: Please seek help immediately!**\n\nYour life matters and help is available. Please reach out to a mental health professional or call a suicide prevention hotline or go to the nearest emergency room. You don't have to face this alone. National Suicide Prevention Lifeline: 1-800-273-8255",
    },
    EmergencyRule {
        name: "unconsciousness",
        keywords: &[
            "unconscious",
            "passed out",
            "fainted",
            "not responding",
            "unresponsive",
            "collapsed",
            "blacked out",
            "lost consciousness",
            "syncope",
        ],
        message: "⚠️ **CALL EMERGENCY SERVICES NOW!**\n\nIf someone is unconscious or unresponsive this is a critical emergency. Call emergency services immediately and follow their instructions while waiting for help to arrive.",
    },
    EmergencyRule {
        name: "severe_bleeding",
        keywords: &[
            "severe bleeding",
            "heavy bleeding",
            "blood won't stop",
            "bleeding profusely",
            "lots of blood",
            "hemorrhage",
            "uncontrolled bleeding",
            "bleeding heavily",
            "massive bleeding",
        ],
        message: "⚠️ **URGENT: This is an emergency!**\n\nSevere bleeding that won't stop requires immediate medical attention. Apply pressure to the wound if possible and call emergency services or go to the emergency room immediately.",
    },
    EmergencyRule {
        name: "severe_abdominal_pain",
        keywords: &[
            "severe abdominal pain",
            "intense stomach pain",
            "sharp abdominal pain",
            "stabbing stomach pain",
            "appendix pain",
            "lower right pain",
            "acute abdomen",
            "unbearable stomach pain",
        ],
        message: "⚠️ **URGENT: Seek immediate medical care!**\n\nSevere abdominal pain could indicate serious conditions like appendicitis, ruptured organs, or internal bleeding. Please go to the emergency room immediately, especially if the pain is sudden, severe, or accompanied by fever, vomiting, or inability to pass stool.",
    },
    EmergencyRule {
        name: "seizure",
        keywords: &[
            "seizure",
            "convulsion",
            "fitting",
            "epileptic fit",
            "having seizure",
            "shaking uncontrollably",
            "convulsing",
            "epilepsy attack",
        ],
        message: "⚠️ **URGENT: Medical emergency!**\n\nSeizures require immediate medical attention. If someone is having a seizure, call emergency services. Keep the person safe, turn them on their side, and do not put anything in their mouth. If the seizure lasts more than 5 minutes or if it's their first seizure, seek emergency care immediately.",
    },
    EmergencyRule {
        name: "severe_burn",
        keywords: &[
            "severe burn",
            "third degree burn",
            "deep burn",
            "major burn",
            "burn injury",
            "scalding",
            "electrical burn",
            "chemical burn",
        ],
        message: "⚠️ **URGENT: Seek emergency care!**\n\nSevere burns require immediate medical attention. Run cool (not cold) water over the burn for 10-20 minutes, cover with a clean cloth, and go to the emergency room. Do not apply ice, butter, or ointments. For electrical or chemical burns, seek help immediately.",
    },
    EmergencyRule {
        name: "fracture",
        keywords: &[
            "broken bone",
            "fracture",
            "bone sticking out",
            "compound fracture",
            "bone break",
            "snapped bone",
            "limb deformed",
            "can't move limb",
        ],
        message: "⚠️ **URGENT: This needs immediate medical attention!**\n\nA suspected fracture or broken bone requires emergency care. Do not try to realign the bone. Immobilize the injured area if possible and go to the emergency room immediately. If the bone is protruding through the skin, this is a medical emergency.",
    },
    EmergencyRule {
        name: "anaphylaxis",
        keywords: &[
            "severe allergic reaction",
            "anaphylaxis",
            "throat swelling",
            "tongue swelling",
            "allergic shock",
            "hives all over",
            "face swelling",
            "allergic emergency",
            "can't breathe allergic",
        ],
        message: "⚠️ **URGENT: Anaphylaxis is life-threatening!**\n\nSevere allergic reactions can be fatal. If experiencing throat swelling, difficulty breathing, or widespread hives after exposure to an allergen, use an EpiPen if available and call emergency services immediately. Go to the ER even if symptoms seem to improve.",
    },
    EmergencyRule {
        name: "hemoptysis",
        keywords: &[
            "coughing blood",
            "vomiting blood",
            "blood in vomit",
            "hemoptysis",
            "throwing up blood",
            "spitting blood",
            "blood cough",
        ],
        message: "⚠️ **URGENT: This is a medical emergency!**\n\nCoughing up or vomiting blood requires immediate medical attention. This could indicate serious conditions affecting your lungs, stomach, or esophagus. Go to the emergency room immediately or call emergency services.",
    },
    EmergencyRule {
        name: "head_trauma",
        keywords: &[
            "severe head injury",
            "head trauma",
            "hit head hard",
            "skull injury",
            "concussion",
            "head wound",
            "blow to head",
            "head bleeding",
        ],
        message: "⚠️ **URGENT: Seek immediate medical care!**\n\nHead injuries can be serious and may cause internal bleeding or brain damage. If you've experienced a significant blow to the head, especially with symptoms like confusion, vomiting, loss of consciousness, or severe headache, go to the emergency room immediately.",
    },
    EmergencyRule {
        name: "sudden_vision_loss",
        keywords: &[
            "sudden vision loss",
            "can't see",
            "blind suddenly",
            "lost vision",
            "vision gone",
            "eye emergency",
            "sudden blindness",
            "seeing flashes",
            "curtain over vision",
        ],
        message: "⚠️ **URGENT: This is an eye emergency!**\n\nSudden vision loss or significant vision changes require immediate medical attention. This could indicate stroke, retinal detachment, or other serious conditions. Go to the emergency room or an eye emergency clinic immediately. Time is critical to prevent permanent vision loss.",
    },
    EmergencyRule {
        name: "severe_dehydration",
        keywords: &[
            "severe dehydration",
            "extremely dehydrated",
            "no urine",
            "dark urine",
            "dizzy standing",
            "fainting dehydrated",
            "severe thirst",
            "dry mouth extreme",
        ],
        message: "⚠️ **URGENT: Severe dehydration needs immediate care!**\n\nSevere dehydration can be life-threatening, especially with symptoms like no urination, extreme dizziness, rapid heartbeat, or confusion. Seek immediate medical attention. You may need IV fluids. This is especially critical for children, elderly, or those with chronic conditions.",
    },
    EmergencyRule {
        name: "diabetic_emergency",
        keywords: &[
            "diabetic emergency",
            "blood sugar very high",
            "blood sugar very low",
            "diabetic coma",
            "insulin shock",
            "hyperglycemia severe",
            "hypoglycemia severe",
            "diabetic crisis",
        ],
        message: "⚠️ **URGENT: Diabetic emergency!**\n\nExtremely high or low blood sugar can be life-threatening. If experiencing confusion, loss of consciousness, severe weakness, rapid breathing, or fruity breath odor, seek emergency care immediately. If you have diabetes and feel something is seriously wrong, don't wait.",
    },
    EmergencyRule {
        name: "poisoning",
        keywords: &[
            "poisoning",
            "swallowed poison",
            "toxic ingestion",
            "overdose",
            "drug overdose",
            "chemical poisoning",
            "ate poison",
            "poisoned",
        ],
        message: "⚠️ **URGENT: Call Poison Control and Emergency Services!**\n\nPoisoning or overdose is a medical emergency. Call your local Poison Control Center (in US: 1-800-222-1222) and emergency services immediately. Do not induce vomiting unless instructed. Bring the substance container to the hospital if possible.",
    },
    EmergencyRule {
        name: "sudden_paralysis",
        keywords: &[
            "sudden paralysis",
            "can't move body",
            "body not moving",
            "paralyzed",
            "complete weakness",
            "lost movement",
            "unable to move",
        ],
        message: "⚠️ **URGENT: This is a critical emergency!**\n\nSudden paralysis or inability to move parts of your body could indicate a stroke, spinal injury, or other serious neurological emergency. Call emergency services immediately. Do not attempt to move if you suspect spinal injury.",
    },
    EmergencyRule {
        name: "severe_asthma",
        keywords: &[
            "severe asthma attack",
            "can't breathe asthma",
            "asthma emergency",
            "inhaler not working",
            "blue lips",
            "gasping for air",
            "severe wheezing",
        ],
        message: "⚠️ **URGENT: Severe asthma attack!**\n\nA severe asthma attack is life-threatening. If your inhaler isn't working, you're struggling to breathe, lips are turning blue, or you can't speak in full sentences, call emergency services immediately. Use your rescue inhaler while waiting for help.",
    },
    EmergencyRule {
        name: "cardiac_arrest",
        keywords: &[
            "heart attack",
            "cardiac arrest",
            "heart stopped",
            "heart failure",
            "chest crushing pain",
            "pain radiating arm",
            "jaw pain heart",
        ],
        message: "⚠️ **URGENT: Possible heart attack!**\n\nHeart attack symptoms include chest pain, pain radiating to arms/jaw/back, shortness of breath, nausea, and cold sweats. This is a life-threatening emergency. Call emergency services immediately. Chew an aspirin (if not allergic) while waiting for help. Every second counts!",
    },
];

/// Scan a patient query against the emergency table.
pub fn detect_emergency(text: &str) -> Option<&'static EmergencyRule> {
    let lower = text.to_lowercase();
    EMERGENCY_RULES.iter().find_map(|rule| {
        rule.first_hit(&lower).map(|keyword| {
            tracing::debug!(rule = rule.name, keyword, "Emergency keyword matched");
            rule
        })
    })
}

/// Escalation message for a query, if any rule fires.
pub fn emergency_message(text: &str) -> Option<&'static str> {
    detect_emergency(text).map(|rule| rule.message)
}
