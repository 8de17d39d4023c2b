//! Prompt texts for the strategist stages.

pub(super) const CLARIFY_IDEA: &str = "\
You are a startup strategist. A founder described this business idea:

{idea}

Rephrase it as an investor-ready vision statement of one or two sentences.
Keep it concise but compelling. Return only the refined idea, nothing else.";

pub(super) const PROBLEM_STATEMENT: &str = "\
Refined startup idea: {refined_idea}

Define the problem this startup solves. Cover the pain points, the scale of the
problem and who faces it. Use the web research below for current market data.
Answer with the problem statement only, in two or three clear sentences.";

pub(super) const PROBLEM_QUERY: &str = "{refined_idea} problem market size statistics";

pub(super) const TARGET_CUSTOMER: &str = "\
Refined startup idea: {refined_idea}

Identify the ideal target customer. Describe demographic and behavioral
characteristics and say exactly who would use this product; avoid generic
audiences. Use the web research below to ground the market segments.
Answer with one specific customer profile.";

pub(super) const CUSTOMER_QUERY: &str = "{refined_idea} target customer demographics";

pub(super) const MVP_PLANNER: &str = "\
Idea: {refined_idea}
Problem: {problem}
Target customer: {customer}

Propose a minimum viable product. List the key features of the simplest version
that can ship in four to six weeks, focused on the core functionality that
addresses the main problem.";

pub(super) const COMPETITOR_ANALYSIS: &str = "\
Refined startup idea: {refined_idea}

Using the web research below, find the top three existing competitors. For each,
give the company name, a brief description of how it solves the same problem
and its main strengths. Output a short list.";

pub(super) const COMPETITOR_QUERY: &str = "{refined_idea} competitors";

pub(super) const MONETIZATION: &str = "\
Idea: {refined_idea}
Competitors: {competitors}

Propose two or three realistic revenue models, such as subscriptions,
transaction fees, licensing or freemium. Consider what the competitors charge
for and where revenue opportunities remain. Explain each model clearly.";

pub(super) const GO_TO_MARKET: &str = "\
MVP: {mvp}
Target customer: {customer}

Propose a go-to-market strategy for acquiring the first 100 users. Name specific
channels (for example Reddit communities, LinkedIn, cold email, content
marketing) and give actionable steps with a timeline.";

pub(super) const PITCH_DECK: &str = "\
Refined idea: {refined_idea}
Problem: {problem}
Target customer: {customer}
MVP: {mvp}
Competitors: {competitors}
Monetization: {monetization}
Go-to-market strategy: {gtm}

Create a pitch deck outline from this material, structured as a professional
investor pitch with these sections:
1. Problem & Opportunity
2. Solution (MVP)
3. Target Market & Customer
4. Competitive Landscape
5. Revenue Model
6. Go-to-Market Strategy
7. Next Steps

Make it investor-ready and compelling.";

pub(super) const MEMORY: &str = "\
Refined idea: {refined_idea}
Problem: {problem}
Target customer: {customer}
MVP: {mvp}
Competitors: {competitors}
Monetization: {monetization}
Go-to-market strategy: {gtm}
Pitch deck: {pitch_deck}

Write a compact memory record of this strategy session: one line per topic
above capturing the key decision, followed by the three most important open
risks. This record is stored for follow-up sessions.";
