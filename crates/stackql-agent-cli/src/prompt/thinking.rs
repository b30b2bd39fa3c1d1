use rand::seq::SliceRandom;

const THINKING_MESSAGES: &[&str] = &[
    "Thinking",
    "Consulting the cloud",
    "Asking StackQL",
    "Scanning providers",
    "Reading the registry",
    "Counting instances",
    "Walking the resource tree",
    "Composing a query",
    "Peeking into buckets",
    "Checking the regions",
    "Following the services",
    "Sorting the results",
];

pub fn get_random_thinking_message() -> &'static str {
    THINKING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Thinking")
}
