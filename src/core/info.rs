use std::str::FromStr;

use strum::{Display, EnumIter};

/// Topics that have an info button on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum InfoTopic {
    #[strum(to_string = "HSSAScoreInfoButton")]
    HssaScore,
    #[strum(to_string = "decayFunctionInfoButton")]
    DecayFunction,
    #[strum(to_string = "epsilonValueSliderInfoButton")]
    EpsilonValue,
    #[strum(to_string = "facilityWeightListInfoButton")]
    FacilityWeights,
}

const HSSA_SCORE: &str = "Stands for blah blah blah blah.";

const DECAY_FUNCTION: &str = "The farther away a facility is the less it should contribute to the HSSA Score.  \
The distance decay function determines the fraction by which a facility is discounted based on its distance from an origin.";

const EPSILON_VALUE: &str = "The streets considered for routing between origins and destinations are determined by the northernmost, \
southernmost, easternmost, and westernmost origin and destination points.  Shortest paths may lie on streets outside of this \"bounding box\".  \
The epsilon value is used to buffer this box.  A value of 0 means no buffering occurs.  A value of 0.5 corresponds roughly to a 0.5 degree distance.";

const FACILITY_WEIGHTS: &str = "Format\n\n\
List numeric weights separated by commas. If only n weight values are given, the n + 1st \
and subsequent facilities will be given a weight of 0. To apply a single weight list to all facilities, input values separated by commas. \
In the below example, the 5th facility will be weighted with the value 0.2, while the 6th facility will be given a weight of zero.\n\n\
    1, 0.8, 0.6, 0.4, 0.2\n\n\
To provide different weight lists for different facility categories:\n\n\
    \"Hospitals\": 1, 0.5; \"Health Clinics\": 1, 0.67, 0.33; \"Default\": 1, 0.8, 0.6, 0.4, 0.2\n\n\
In the above example, the weight list \"Default\" will be applied to all facilities not of category \"Hospitals\" or \"Health Clinics\".  \
If no input is given, a weight list of 1, 1, 1, 1, 1, 1, 1, 1, 1, 1 is used for all facilities.";

impl InfoTopic {
    pub fn button_id(&self) -> String {
        self.to_string()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::HssaScore => "HSSA Score",
            Self::DecayFunction => "Distance decay function",
            Self::EpsilonValue => "Epsilon value",
            Self::FacilityWeights => "Custom facility weights",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Self::HssaScore => HSSA_SCORE,
            Self::DecayFunction => DECAY_FUNCTION,
            Self::EpsilonValue => EPSILON_VALUE,
            Self::FacilityWeights => FACILITY_WEIGHTS,
        }
    }
}

impl FromStr for InfoTopic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HSSAScoreInfoButton" => Ok(Self::HssaScore),
            "decayFunctionInfoButton" => Ok(Self::DecayFunction),
            "epsilonValueSliderInfoButton" => Ok(Self::EpsilonValue),
            "facilityWeightListInfoButton" => Ok(Self::FacilityWeights),
            _ => Err(format!("Unknown info button: {}", s)),
        }
    }
}

/// Modal info dialog. Opening a topic while one is shown swaps the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoDialogState {
    current: Option<InfoTopic>,
}

impl InfoDialogState {
    pub fn open(&mut self, topic: InfoTopic) {
        self.current = Some(topic);
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<InfoTopic> {
        self.current
    }
}
