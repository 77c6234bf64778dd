/// The fixed evaluation framework: ten ordered sales-behavior criteria, each
/// with a definition, a behavioral rubric, and the sub-questions the analyzer
/// gathers evidence for. Static reference data, not stored in the database.

pub const CRITERION_COUNT: usize = 10;

#[derive(Debug)]
pub struct SubQuestion {
    pub order: u8,
    pub text: &'static str,
}

#[derive(Debug)]
pub struct Criterion {
    /// 1-based position; verdicts and prompt entries are keyed by it.
    pub position: u8,
    pub name: &'static str,
    pub definition: &'static str,
    pub expected_behavior: &'static str,
    pub coaching_area: &'static str,
    pub key_reminder: &'static str,
    pub sub_questions: &'static [SubQuestion],
}

pub fn criterion_catalog() -> &'static [Criterion; CRITERION_COUNT] {
    &CATALOG
}

/// Look up a criterion by its 1-based position.
pub fn criterion_at(position: u8) -> Option<&'static Criterion> {
    CATALOG.get(position.checked_sub(1)? as usize)
}

static CATALOG: [Criterion; CRITERION_COUNT] = [
    Criterion {
        position: 1,
        name: "Trigger Event & Impact",
        definition: "Why the customer is buying now and the measurable results they expect from solving the problem.",
        expected_behavior: "Asks what happened that started this initiative and confirms the business impact in numbers the customer agrees with.",
        coaching_area: "Discovery",
        key_reminder: "No trigger event usually means no deal - deals without urgency stall.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson identify a specific event that prompted the customer to look for a solution?",
            },
            SubQuestion {
                order: 2,
                text: "Did the salesperson quantify the impact of the trigger event with the customer?",
            },
            SubQuestion {
                order: 3,
                text: "Did the customer confirm the expected measurable outcome of solving the problem?",
            },
        ],
    },
    Criterion {
        position: 2,
        name: "Trigger Priority",
        definition: "Whether solving this problem is truly a priority for the decision influencers, relative to everything else on their plate.",
        expected_behavior: "Tests urgency directly: asks where this initiative ranks and what happens if it slips a quarter.",
        coaching_area: "Qualification",
        key_reminder: "A real priority has a deadline and an owner.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson ask how this initiative ranks against the customer's other priorities?",
            },
            SubQuestion {
                order: 2,
                text: "Did the salesperson confirm a timeline or deadline attached to the initiative?",
            },
            SubQuestion {
                order: 3,
                text: "Is there evidence the priority comes from the decision influencers rather than only the contact?",
            },
        ],
    },
    Criterion {
        position: 3,
        name: "Sales Target",
        definition: "What the customer plans to buy, how much, and when.",
        expected_behavior: "Pins down scope, volume, and purchase window instead of assuming them from the conversation.",
        coaching_area: "Qualification",
        key_reminder: "Vague scope now becomes a stalled procurement later.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson establish what the customer intends to purchase?",
            },
            SubQuestion {
                order: 2,
                text: "Did the salesperson establish quantity or deal size?",
            },
            SubQuestion {
                order: 3,
                text: "Did the salesperson establish when the customer plans to buy?",
            },
        ],
    },
    Criterion {
        position: 4,
        name: "Decision Influencer",
        definition: "Who influences the purchase decision and what each of them cares about.",
        expected_behavior: "Maps the people involved, their roles, and their individual priorities; engages the key influencer directly.",
        coaching_area: "Stakeholders",
        key_reminder: "The person you talk to is rarely the only person who decides.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson identify who influences the buying decision?",
            },
            SubQuestion {
                order: 2,
                text: "Did the salesperson learn what the key influencer personally cares about?",
            },
            SubQuestion {
                order: 3,
                text: "Was the key decision influencer engaged in the conversation or a next step with them agreed?",
            },
        ],
    },
    Criterion {
        position: 5,
        name: "Individual Impact",
        definition: "How success or failure of this initiative affects the decision influencers personally.",
        expected_behavior: "Goes beyond the business case to what the outcome means for the individuals involved.",
        coaching_area: "Stakeholders",
        key_reminder: "People buy for their own reasons, then justify with the company's.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson explore what success would mean personally for a decision influencer?",
            },
            SubQuestion {
                order: 2,
                text: "Did the salesperson explore the personal cost of failure or inaction?",
            },
        ],
    },
    Criterion {
        position: 6,
        name: "Mentor",
        definition: "An internal champion who wants the salesperson to win and shares inside information.",
        expected_behavior: "Identifies or develops a mentor, verifies their influence, and tests the information they provide.",
        coaching_area: "Stakeholders",
        key_reminder: "A mentor tells you what you cannot see from outside.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson identify someone inside the account acting as a champion or mentor?",
            },
            SubQuestion {
                order: 2,
                text: "Did the mentor share non-public information about the deal or the organization?",
            },
            SubQuestion {
                order: 3,
                text: "Did the salesperson verify the mentor's influence on the decision?",
            },
        ],
    },
    Criterion {
        position: 7,
        name: "Decision Making Process",
        definition: "How the organization will actually make and approve this buying decision, step by step.",
        expected_behavior: "Maps the full process: evaluation steps, approvers, procurement, legal, and the timeline between them.",
        coaching_area: "Process",
        key_reminder: "Deals die in the steps you did not know existed.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson map the steps from evaluation to signature?",
            },
            SubQuestion {
                order: 2,
                text: "Did the salesperson identify who signs off at each step?",
            },
            SubQuestion {
                order: 3,
                text: "Did the salesperson confirm a timeline for the decision process?",
            },
        ],
    },
    Criterion {
        position: 8,
        name: "Fit",
        definition: "Whether the solution genuinely fits the customer's requirements, confirmed by the customer rather than asserted by the seller.",
        expected_behavior: "Validates fit against the customer's stated requirements and surfaces gaps honestly.",
        coaching_area: "Solution",
        key_reminder: "Fit claimed by the seller is an opinion; fit confirmed by the buyer is progress.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the customer state their requirements and did the salesperson map the solution to them?",
            },
            SubQuestion {
                order: 2,
                text: "Did the customer confirm the solution fits their needs?",
            },
        ],
    },
    Criterion {
        position: 9,
        name: "Alternatives",
        definition: "The alternatives the customer is considering: competitors, building in-house, or doing nothing.",
        expected_behavior: "Asks directly what else is being evaluated, including the status quo, and how seriously.",
        coaching_area: "Competition",
        key_reminder: "The most common competitor is no decision at all.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson ask what alternatives the customer is considering?",
            },
            SubQuestion {
                order: 2,
                text: "Was the status quo or do-nothing option explicitly discussed?",
            },
        ],
    },
    Criterion {
        position: 10,
        name: "Our Solution Ranking",
        definition: "Where the solution currently ranks against the alternatives in the customer's view.",
        expected_behavior: "Asks the uncomfortable question: if you decided today, who would you pick and why?",
        coaching_area: "Competition",
        key_reminder: "If you do not know your ranking, assume you are second.",
        sub_questions: &[
            SubQuestion {
                order: 1,
                text: "Did the salesperson ask how the solution compares to the alternatives being considered?",
            },
            SubQuestion {
                order: 2,
                text: "Did the customer indicate a current preference or ranking?",
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_ten_ordered_criteria() {
        let catalog = criterion_catalog();
        assert_eq!(catalog.len(), CRITERION_COUNT);
        for (idx, criterion) in catalog.iter().enumerate() {
            assert_eq!(criterion.position as usize, idx + 1);
            assert!(!criterion.sub_questions.is_empty());
            for (q_idx, question) in criterion.sub_questions.iter().enumerate() {
                assert_eq!(question.order as usize, q_idx + 1);
            }
        }
    }

    #[test]
    fn lookup_by_position_is_one_based() {
        assert_eq!(criterion_at(1).unwrap().name, "Trigger Event & Impact");
        assert_eq!(criterion_at(10).unwrap().name, "Our Solution Ranking");
        assert!(criterion_at(0).is_none());
        assert!(criterion_at(11).is_none());
    }
}
